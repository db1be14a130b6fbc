mod create;
mod delete;
mod invite;
mod join;

pub use create::{CreateGroupAction, CreateGroupInput};
pub use delete::DeleteGroupAction;
pub use invite::InviteMemberAction;
pub use join::JoinGroupAction;
