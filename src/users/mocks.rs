#![allow(clippy::significant_drop_tightening)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repository::{CreateUser, TokenRepository, UserRepository};
use super::types::{AccessToken, SystemRole, User};
use crate::crypto::{generate_token_default, hash_token};
use crate::HearthError;

#[derive(Clone)]
pub struct MockUserRepository {
    pub users: Arc<RwLock<Vec<User>>>,
    pub favorites: Arc<RwLock<Vec<(i64, i64)>>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(vec![])),
            favorites: Arc::new(RwLock::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Inserts a user directly, bypassing registration. Test setup helper.
    pub fn seed_user(&self, email: &str, name: &str, role: SystemRole) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let user = User {
            id,
            email: email.to_owned(),
            name: name.to_owned(),
            hashed_password: "fakehashedpassword".to_owned(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.users.write().unwrap().push(user.clone());
        user
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, data: CreateUser) -> Result<User, HearthError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let user = User {
            id,
            email: data.email,
            name: data.name,
            hashed_password: data.hashed_password,
            role: data.role,
            created_at: now,
            updated_at: now,
        };

        let mut users = self
            .users
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, HearthError> {
        let users = self
            .users
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, HearthError> {
        let users = self
            .users
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, HearthError> {
        let users = self
            .users
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(users.clone())
    }

    async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        name: Option<&str>,
        role: Option<SystemRole>,
    ) -> Result<User, HearthError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(HearthError::UserNotFound)?;

        if let Some(e) = email {
            e.clone_into(&mut user.email);
        }
        if let Some(n) = name {
            n.clone_into(&mut user.name);
        }
        if let Some(r) = role {
            user.role = r;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(HearthError::UserNotFound);
        }
        Ok(())
    }

    async fn list_favorite_ids(&self, user_id: i64) -> Result<Vec<i64>, HearthError> {
        let favorites = self
            .favorites
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(favorites
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid)
            .collect())
    }

    async fn is_favorite(&self, user_id: i64, recipe_id: i64) -> Result<bool, HearthError> {
        let favorites = self
            .favorites
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(favorites.contains(&(user_id, recipe_id)))
    }

    async fn add_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError> {
        let mut favorites = self
            .favorites
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        if !favorites.contains(&(user_id, recipe_id)) {
            favorites.push((user_id, recipe_id));
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: i64, recipe_id: i64) -> Result<(), HearthError> {
        let mut favorites = self
            .favorites
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        favorites.retain(|entry| *entry != (user_id, recipe_id));
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockTokenRepository {
    pub tokens: Arc<RwLock<Vec<AccessToken>>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(vec![])),
        }
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, HearthError> {
        let plain_token = generate_token_default();
        let now = Utc::now();

        let stored = AccessToken {
            token: hash_token(&plain_token),
            user_id,
            expires_at,
            created_at: now,
        };

        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        tokens.push(stored);

        // Return with plain token
        Ok(AccessToken {
            token: plain_token,
            user_id,
            expires_at,
            created_at: now,
        })
    }

    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, HearthError> {
        let hashed = hash_token(token);
        let tokens = self
            .tokens
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(tokens.iter().find(|t| t.token == hashed).cloned())
    }

    async fn revoke_token(&self, token: &str) -> Result<(), HearthError> {
        let hashed = hash_token(token);
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        tokens.retain(|t| t.token != hashed);
        Ok(())
    }

    async fn revoke_all_user_tokens(&self, user_id: i64) -> Result<(), HearthError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        tokens.retain(|t| t.user_id != user_id);
        Ok(())
    }
}
