use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ErrorResponse;
use crate::HearthError;

/// converts `HearthError` into appropriate HTTP responses
#[derive(Debug)]
pub struct AppError(pub HearthError);

impl From<HearthError> for AppError {
    fn from(err: HearthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse::from(self.0.clone());
        let status = match &self.0 {
            HearthError::Validation(_)
            | HearthError::UserAlreadyExists
            | HearthError::AlreadyMember
            | HearthError::CannotDeleteSelf => StatusCode::BAD_REQUEST,
            HearthError::AuthenticationRequired
            | HearthError::TokenInvalid
            | HearthError::TokenExpired
            | HearthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HearthError::Forbidden(_)
            | HearthError::PrivateGroup
            | HearthError::CreatorCannotLeave
            | HearthError::CannotRemoveCreator => StatusCode::FORBIDDEN,
            HearthError::NotFound
            | HearthError::UserNotFound
            | HearthError::GroupNotFound(_)
            | HearthError::NotAMember => StatusCode::NOT_FOUND,
            HearthError::PasswordHashError
            | HearthError::DatabaseError(_)
            | HearthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(error_response)).into_response()
    }
}
