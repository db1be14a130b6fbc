use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{AccessToken, SystemRole, User};
use crate::HearthError;

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub role: SystemRole,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, data: CreateUser) -> Result<User, HearthError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, HearthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, HearthError>;

    async fn list(&self) -> Result<Vec<User>, HearthError>;

    /// Updates any subset of email, name, and system role.
    async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        name: Option<&str>,
        role: Option<SystemRole>,
    ) -> Result<User, HearthError>;

    async fn delete(&self, id: i64) -> Result<(), HearthError>;

    // Favorites are stored per user, one row per (user, recipe).

    async fn list_favorite_ids(&self, user_id: i64) -> Result<Vec<i64>, HearthError>;

    async fn is_favorite(&self, user_id: i64, recipe_id: i64) -> Result<bool, HearthError>;

    async fn add_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError>;

    async fn remove_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Creates a token for the user. The returned [`AccessToken`] carries the
    /// plain token; only its hash is persisted.
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, HearthError>;

    /// Looks a token up by its plain value (hashing is handled internally).
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, HearthError>;

    async fn revoke_token(&self, token: &str) -> Result<(), HearthError>;

    async fn revoke_all_user_tokens(&self, user_id: i64) -> Result<(), HearthError>;
}
