//! `SQLite`-backed repository implementations.

pub mod migrations;

mod groups;
mod recipes;
mod token;
mod user;

pub use groups::{SqliteGroupMembershipRepository, SqliteGroupRepository};
pub use recipes::SqliteRecipeRepository;
pub use token::SqliteTokenRepository;
pub use user::SqliteUserRepository;

use crate::HearthError;

pub(crate) fn db_error(operation: &str) -> impl FnOnce(sqlx::Error) -> HearthError + '_ {
    move |e| {
        log::error!(target: "hearth", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
        HearthError::DatabaseError(e.to_string())
    }
}
