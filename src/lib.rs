pub mod access;
pub mod actions;
pub mod api;
pub mod crypto;
pub mod groups;
pub mod recipes;
pub mod users;
pub mod validators;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use crypto::SecretString;
pub use users::{AccessToken, SystemRole, TokenRepository, User, UserRepository};
pub use validators::FieldErrors;

#[cfg(feature = "mocks")]
pub use users::{MockTokenRepository, MockUserRepository};

use std::fmt;

/// Crate-wide error type.
///
/// Variants are grouped by how the HTTP layer reports them: validation
/// failures (400), authentication failures (401), authorization failures
/// (403), missing entities (404), and infrastructure errors (500).
#[derive(Debug, Clone, PartialEq)]
pub enum HearthError {
    /// Per-field validation failures, reported as a structured map.
    Validation(FieldErrors),
    UserAlreadyExists,
    AlreadyMember,
    CannotDeleteSelf,
    AuthenticationRequired,
    TokenInvalid,
    TokenExpired,
    InvalidCredentials,
    /// Requester lacks a privilege; the message names what is missing.
    Forbidden(String),
    PrivateGroup,
    CreatorCannotLeave,
    CannotRemoveCreator,
    NotFound,
    UserNotFound,
    /// A referenced group does not exist; carries the offending id.
    GroupNotFound(i64),
    NotAMember,
    PasswordHashError,
    DatabaseError(String),
    Internal(String),
}

impl std::error::Error for HearthError {}

impl fmt::Display for HearthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HearthError::Validation(errors) => {
                write!(f, "Validation error: {}", errors.summary())
            }
            HearthError::UserAlreadyExists => write!(f, "User already exists"),
            HearthError::AlreadyMember => write!(f, "You are already a member of this group"),
            HearthError::CannotDeleteSelf => write!(f, "Cannot delete your own account"),
            HearthError::AuthenticationRequired => write!(f, "Please login to perform this action"),
            HearthError::TokenInvalid => write!(f, "Invalid token"),
            HearthError::TokenExpired => write!(f, "Token has expired"),
            HearthError::InvalidCredentials => write!(f, "Invalid email or password"),
            HearthError::Forbidden(msg) => write!(f, "{msg}"),
            HearthError::PrivateGroup => {
                write!(f, "This group is private. You need an invite link to join.")
            }
            HearthError::CreatorCannotLeave => {
                write!(f, "Group creator cannot leave the group. Delete it instead.")
            }
            HearthError::CannotRemoveCreator => write!(f, "Cannot remove the group creator"),
            HearthError::NotFound => write!(f, "Not found"),
            HearthError::UserNotFound => write!(f, "User not found"),
            HearthError::GroupNotFound(id) => write!(f, "Group {id} not found"),
            HearthError::NotAMember => write!(f, "User is not a member of this group"),
            HearthError::PasswordHashError => write!(f, "Failed to hash password"),
            HearthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            HearthError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}
