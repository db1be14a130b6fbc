mod group;
mod membership;

pub use group::SqliteGroupRepository;
pub use membership::SqliteGroupMembershipRepository;

pub(crate) use super::db_error;
