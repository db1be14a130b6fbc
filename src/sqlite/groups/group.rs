//! `SQLite` implementation of [`GroupRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::db_error;
use crate::groups::{CreateGroup, Group, GroupPrivacy, GroupRepository};
use crate::HearthError;

/// `SQLite`-backed group repository.
#[derive(Clone)]
pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct GroupRecord {
    id: i64,
    name: String,
    description: String,
    privacy: String,
    creator_id: i64,
    invite_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GroupRecord> for Group {
    type Error = HearthError;

    fn try_from(row: GroupRecord) -> Result<Self, Self::Error> {
        let privacy = GroupPrivacy::parse(&row.privacy).ok_or_else(|| {
            HearthError::DatabaseError(format!("unknown group privacy: {}", row.privacy))
        })?;
        Ok(Group {
            id: row.id,
            name: row.name,
            description: row.description,
            privacy,
            creator_id: row.creator_id,
            invite_code: row.invite_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const GROUP_COLUMNS: &str =
    "id, name, description, privacy, creator_id, invite_code, created_at, updated_at";

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateGroup) -> Result<Group, HearthError> {
        let row: GroupRecord = sqlx::query_as(
            r"
            INSERT INTO groups (name, description, privacy, creator_id, invite_code)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, description, privacy, creator_id, invite_code, created_at, updated_at
            ",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.privacy.as_str())
        .bind(data.creator_id)
        .bind(&data.invite_code)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create_group"))?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, HearthError> {
        let row: Option<GroupRecord> =
            sqlx::query_as(&format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_group_by_id"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>, HearthError> {
        let row: Option<GroupRecord> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE invite_code = ?"
        ))
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_group_by_invite_code"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, HearthError> {
        let rows: Vec<GroupRecord> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE creator_id = ? ORDER BY created_at ASC"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find_groups_by_creator"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn search_public(&self, search: Option<&str>) -> Result<Vec<Group>, HearthError> {
        let rows: Vec<GroupRecord> = match search {
            Some(needle) => {
                let pattern = format!("%{}%", needle.to_lowercase());
                sqlx::query_as(&format!(
                    r"
                    SELECT {GROUP_COLUMNS} FROM groups
                    WHERE privacy = 'public'
                      AND (LOWER(name) LIKE ? OR LOWER(description) LIKE ?)
                    ORDER BY created_at DESC
                    "
                ))
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {GROUP_COLUMNS} FROM groups WHERE privacy = 'public' ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error("search_public_groups"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, name, description), err))]
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        privacy: Option<GroupPrivacy>,
    ) -> Result<Group, HearthError> {
        let row: GroupRecord = sqlx::query_as(
            r"
            UPDATE groups
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                privacy = COALESCE(?, privacy),
                updated_at = ?
            WHERE id = ?
            RETURNING id, name, description, privacy, creator_id, invite_code, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(privacy.map(|p| p.as_str()))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HearthError::NotFound,
            _ => db_error("update_group")(e),
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn set_creator(&self, group_id: i64, user_id: i64) -> Result<Group, HearthError> {
        let row: GroupRecord = sqlx::query_as(
            r"
            UPDATE groups SET creator_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, description, privacy, creator_id, invite_code, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HearthError::NotFound,
            _ => db_error("set_group_creator")(e),
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_group"))?;

        Ok(())
    }
}
