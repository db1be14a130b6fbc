use crate::users::TokenRepository;
use crate::HearthError;

/// Action to revoke the presented bearer token.
pub struct LogoutAction<T: TokenRepository> {
    token_repository: T,
}

impl<T: TokenRepository> LogoutAction<T> {
    pub fn new(token_repository: T) -> Self {
        Self { token_repository }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all, err))]
    pub async fn execute(&self, token: &str) -> Result<(), HearthError> {
        self.token_repository.revoke_token(token).await
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::users::MockTokenRepository;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let repo = MockTokenRepository::new();
        let token = repo
            .create_token(1, Utc::now() + Duration::days(7))
            .await
            .unwrap();

        LogoutAction::new(repo.clone())
            .execute(&token.token)
            .await
            .unwrap();

        assert!(repo.find_token(&token.token).await.unwrap().is_none());
    }
}
