use chrono::{Duration, Utc};

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::users::{AccessToken, TokenRepository, User, UserRepository};
use crate::HearthError;

/// Days until an issued access token expires.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Action to log a user in and issue a bearer token.
pub struct LoginAction<U, T, H = Argon2Hasher>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    user_repository: U,
    token_repository: T,
    hasher: H,
}

impl<U: UserRepository, T: TokenRepository> LoginAction<U, T> {
    pub fn new(user_repository: U, token_repository: T) -> Self {
        Self {
            user_repository,
            token_repository,
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<U: UserRepository, T: TokenRepository, H: PasswordHasher> LoginAction<U, T, H> {
    pub fn with_hasher(user_repository: U, token_repository: T, hasher: H) -> Self {
        Self {
            user_repository,
            token_repository,
            hasher,
        }
    }

    /// Verifies credentials and issues a token. Unknown emails and wrong
    /// passwords produce the same error.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "login", skip_all, err))]
    pub async fn execute(&self, email: &str, password: &str) -> Result<(User, AccessToken), HearthError> {
        if let Some(user) = self.user_repository.find_by_email(email).await? {
            if self.hasher.verify(password, &user.hashed_password)? {
                let expires_at = Utc::now() + Duration::days(TOKEN_EXPIRY_DAYS);
                let token = self
                    .token_repository
                    .create_token(user.id, expires_at)
                    .await?;

                log::info!(target: "hearth", "msg=\"user logged in\", user_id={}", user.id);

                return Ok((user, token));
            }
        }
        Err(HearthError::InvalidCredentials)
    }
}
