//! Axum HTTP layer.
//!
//! Routers are generic over the repository implementations in
//! [`AppState`], so the same handlers serve the `SQLite` backend in
//! production and the mock repositories in tests.

mod error;
mod groups;
mod middleware;
mod recipes;
mod routes;
mod users;

pub use error::AppError;
pub use middleware::{extract_bearer_token, AuthenticatedUser, MaybeUser};
pub use routes::{router, AppState};
