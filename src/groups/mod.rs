pub mod actions;
mod repository;
mod types;

pub use actions::{
    CreateGroupAction, CreateGroupInput, DeleteGroupAction, InviteMemberAction, JoinGroupAction,
};
pub use repository::{CreateGroup, CreateMember, GroupMembershipRepository, GroupRepository};
pub use types::{Group, GroupMember, GroupPrivacy, GroupRole};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{MockGroupMembershipRepository, MockGroupRepository};
