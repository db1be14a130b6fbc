//! `SQLite` implementation of [`TokenRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::db_error;
use crate::crypto::{generate_token_default, hash_token};
use crate::users::{AccessToken, TokenRepository};
use crate::HearthError;

/// `SQLite`-backed access-token repository. Tokens are stored hashed.
#[derive(Clone)]
pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TokenRecord {
    token: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<TokenRecord> for AccessToken {
    fn from(row: TokenRecord) -> Self {
        AccessToken {
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, HearthError> {
        let plain_token = generate_token_default();
        let hashed = hash_token(&plain_token);
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO access_tokens (token, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(&hashed)
        .bind(user_id)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("create_token"))?;

        // the caller gets the plain token; only the hash is at rest
        Ok(AccessToken {
            token: plain_token,
            user_id,
            expires_at,
            created_at: now,
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, HearthError> {
        let hashed = hash_token(token);

        let row: Option<TokenRecord> = sqlx::query_as(
            "SELECT token, user_id, expires_at, created_at FROM access_tokens WHERE token = ?",
        )
        .bind(&hashed)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_token"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn revoke_token(&self, token: &str) -> Result<(), HearthError> {
        let hashed = hash_token(token);

        sqlx::query("DELETE FROM access_tokens WHERE token = ?")
            .bind(&hashed)
            .execute(&self.pool)
            .await
            .map_err(db_error("revoke_token"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn revoke_all_user_tokens(&self, user_id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("revoke_all_user_tokens"))?;

        Ok(())
    }
}
