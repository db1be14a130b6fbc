use async_trait::async_trait;

use super::types::{Group, GroupMember, GroupPrivacy, GroupRole};
use crate::HearthError;

#[derive(Debug, Clone)]
pub struct CreateGroup {
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub creator_id: i64,
    pub invite_code: String,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub group_id: i64,
    pub user_id: i64,
    pub role: GroupRole,
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, data: CreateGroup) -> Result<Group, HearthError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, HearthError>;

    /// Exact invite-code match, regardless of the group's privacy.
    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>, HearthError>;

    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, HearthError>;

    /// Public groups, optionally filtered by a name/description substring,
    /// newest first.
    async fn search_public(&self, search: Option<&str>) -> Result<Vec<Group>, HearthError>;

    /// Updates any subset of name, description, and privacy.
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        privacy: Option<GroupPrivacy>,
    ) -> Result<Group, HearthError>;

    /// Reassigns the creator, used by the user-deletion cascade.
    async fn set_creator(&self, group_id: i64, user_id: i64) -> Result<Group, HearthError>;

    async fn delete(&self, id: i64) -> Result<(), HearthError>;
}

#[async_trait]
pub trait GroupMembershipRepository: Send + Sync {
    /// Inserts a membership row. The (group, user) pair must be unique;
    /// callers check for an existing membership first.
    async fn create(&self, data: CreateMember) -> Result<GroupMember, HearthError>;

    async fn find_by_group_and_user(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<Option<GroupMember>, HearthError>;

    /// All members of a group, ordered by join time.
    async fn find_by_group(&self, group_id: i64) -> Result<Vec<GroupMember>, HearthError>;

    /// All memberships held by a user.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<GroupMember>, HearthError>;

    async fn update_role(
        &self,
        group_id: i64,
        user_id: i64,
        role: GroupRole,
    ) -> Result<GroupMember, HearthError>;

    async fn delete(&self, group_id: i64, user_id: i64) -> Result<(), HearthError>;

    /// Removes the user from every group. Part of the user-deletion cascade.
    async fn delete_by_user(&self, user_id: i64) -> Result<(), HearthError>;
}
