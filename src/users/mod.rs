mod repository;
mod types;

pub use repository::{CreateUser, TokenRepository, UserRepository};
pub use types::{AccessToken, SystemRole, User};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{MockTokenRepository, MockUserRepository};
