use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::AppState;
use crate::users::{TokenRepository, User, UserRepository};
use crate::HearthError;

/// validates bearer token from `Authorization` header and retrieves user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user: User,
    token: String,
    _marker: PhantomData<(U, T)>,
}

impl<U, T> AuthenticatedUser<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn into_inner(self) -> User {
        self.user
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// The plain bearer token the request carried; used by logout.
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Extracts the requester when a token is present, `None` for anonymous
/// requests. A token that is present but invalid or expired is still an
/// error: silently downgrading to anonymous would mask client bugs.
#[derive(Debug, Clone)]
pub struct MaybeUser<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user: Option<User>,
    _marker: PhantomData<(U, T)>,
}

impl<U, T> MaybeUser<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

async fn lookup_user<U, T>(user_repo: &U, token_repo: &T, token: &str) -> Result<User, AppError>
where
    U: UserRepository,
    T: TokenRepository,
{
    // find_token handles hashing internally
    let access_token = token_repo
        .find_token(token)
        .await
        .map_err(AppError)?
        .ok_or(AppError(HearthError::TokenInvalid))?;

    if access_token.expires_at < chrono::Utc::now() {
        return Err(AppError(HearthError::TokenExpired));
    }

    user_repo
        .find_by_id(access_token.user_id)
        .await
        .map_err(AppError)?
        .ok_or(AppError(HearthError::UserNotFound))
}

impl<U, T, G, M, R> FromRequestParts<AppState<U, T, G, M, R>> for AuthenticatedUser<U, T>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, T, G, M, R>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or(AppError(HearthError::AuthenticationRequired))?;

        let user = lookup_user(&state.user_repo, &state.token_repo, &token).await?;

        Ok(AuthenticatedUser {
            user,
            token,
            _marker: PhantomData,
        })
    }
}

impl<U, T, G, M, R> FromRequestParts<AppState<U, T, G, M, R>> for MaybeUser<U, T>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, T, G, M, R>,
    ) -> Result<Self, Self::Rejection> {
        let user = match extract_bearer_token(&parts.headers) {
            Some(token) => Some(lookup_user(&state.user_repo, &state.token_repo, &token).await?),
            None => None,
        };

        Ok(MaybeUser {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(extract_bearer_token(&headers).is_none());
    }
}
