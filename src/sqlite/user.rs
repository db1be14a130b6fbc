//! `SQLite` implementation of [`UserRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::db_error;
use crate::users::{CreateUser, SystemRole, User, UserRepository};
use crate::HearthError;

/// `SQLite`-backed user repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    name: String,
    hashed_password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = HearthError;

    fn try_from(row: UserRecord) -> Result<Self, Self::Error> {
        let role = SystemRole::parse(&row.role)
            .ok_or_else(|| HearthError::DatabaseError(format!("unknown system role: {}", row.role)))?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            hashed_password: row.hashed_password,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, hashed_password, role, created_at, updated_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateUser) -> Result<User, HearthError> {
        let row: UserRecord = sqlx::query_as(
            r"
            INSERT INTO users (email, name, hashed_password, role)
            VALUES (?, ?, ?, ?)
            RETURNING id, email, name, hashed_password, role, created_at, updated_at
            ",
        )
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.hashed_password)
        .bind(data.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create_user"))?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, HearthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_user_by_id"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, HearthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_user_by_email"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list(&self) -> Result<Vec<User>, HearthError> {
        let rows: Vec<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list_users"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email, name), err))]
    async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        name: Option<&str>,
        role: Option<SystemRole>,
    ) -> Result<User, HearthError> {
        let row: UserRecord = sqlx::query_as(
            r"
            UPDATE users
            SET email = COALESCE(?, email),
                name = COALESCE(?, name),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            RETURNING id, email, name, hashed_password, role, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(name)
        .bind(role.map(|r| r.as_str()))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HearthError::UserNotFound,
            _ => db_error("update_user")(e),
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_user"))?;

        if result.rows_affected() == 0 {
            return Err(HearthError::UserNotFound);
        }

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_favorite_ids(&self, user_id: i64) -> Result<Vec<i64>, HearthError> {
        sqlx::query_scalar(
            "SELECT recipe_id FROM favorites WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list_favorite_ids"))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn is_favorite(&self, user_id: i64, recipe_id: i64) -> Result<bool, HearthError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ? AND recipe_id = ?)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("is_favorite"))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn add_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError> {
        sqlx::query(
            "INSERT INTO favorites (user_id, recipe_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("add_favorite"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn remove_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("remove_favorite"))?;

        Ok(())
    }
}
