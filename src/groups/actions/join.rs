use crate::groups::{
    CreateMember, Group, GroupMembershipRepository, GroupPrivacy, GroupRepository, GroupRole,
};
use crate::HearthError;

/// Action to join a group, either openly (public groups) or through an
/// invite code (any privacy). Joiners always enter with role `member`.
pub struct JoinGroupAction<G, M>
where
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    group_repo: G,
    membership_repo: M,
}

impl<G: GroupRepository, M: GroupMembershipRepository> JoinGroupAction<G, M> {
    pub fn new(group_repo: G, membership_repo: M) -> Self {
        Self {
            group_repo,
            membership_repo,
        }
    }

    /// Joins a public group directly.
    ///
    /// # Errors
    ///
    /// - `HearthError::NotFound` - group does not exist
    /// - `HearthError::PrivateGroup` - group is private, an invite is needed
    /// - `HearthError::AlreadyMember` - requester is already a member
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "join_public_group", skip_all, err)
    )]
    pub async fn join_public(&self, group_id: i64, user_id: i64) -> Result<Group, HearthError> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or(HearthError::NotFound)?;

        if group.privacy != GroupPrivacy::Public {
            return Err(HearthError::PrivateGroup);
        }

        self.add_member(&group, user_id).await?;
        Ok(group)
    }

    /// Joins through an exact invite-code match, regardless of the group's
    /// privacy.
    ///
    /// # Errors
    ///
    /// - `HearthError::NotFound` - no group carries this code
    /// - `HearthError::AlreadyMember` - requester is already a member
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "join_via_invite", skip_all, err)
    )]
    pub async fn join_with_code(&self, invite_code: &str, user_id: i64) -> Result<Group, HearthError> {
        let group = self
            .group_repo
            .find_by_invite_code(invite_code)
            .await?
            .ok_or(HearthError::NotFound)?;

        self.add_member(&group, user_id).await?;
        Ok(group)
    }

    async fn add_member(&self, group: &Group, user_id: i64) -> Result<(), HearthError> {
        if self
            .membership_repo
            .find_by_group_and_user(group.id, user_id)
            .await?
            .is_some()
        {
            return Err(HearthError::AlreadyMember);
        }

        self.membership_repo
            .create(CreateMember {
                group_id: group.id,
                user_id,
                role: GroupRole::Member,
            })
            .await?;

        log::info!(
            target: "hearth",
            "msg=\"member joined group\", group_id={}, user_id={user_id}",
            group.id
        );

        Ok(())
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::groups::{CreateGroup, MockGroupMembershipRepository, MockGroupRepository};

    async fn seed_group(repo: &MockGroupRepository, privacy: GroupPrivacy) -> Group {
        repo.create(CreateGroup {
            name: "Family".into(),
            description: String::new(),
            privacy,
            creator_id: 1,
            invite_code: crate::crypto::generate_invite_code(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_join_public_group() {
        let group_repo = MockGroupRepository::new();
        let membership_repo = MockGroupMembershipRepository::new();
        let group = seed_group(&group_repo, GroupPrivacy::Public).await;

        let action = JoinGroupAction::new(group_repo, membership_repo.clone());
        action.join_public(group.id, 2).await.unwrap();

        let member = membership_repo
            .find_by_group_and_user(group.id, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, GroupRole::Member);
    }

    #[tokio::test]
    async fn test_join_private_group_needs_invite() {
        let group_repo = MockGroupRepository::new();
        let group = seed_group(&group_repo, GroupPrivacy::Private).await;

        let action = JoinGroupAction::new(group_repo, MockGroupMembershipRepository::new());
        let err = action.join_public(group.id, 2).await.unwrap_err();
        assert_eq!(err, HearthError::PrivateGroup);
    }

    #[tokio::test]
    async fn test_join_unknown_group() {
        let action = JoinGroupAction::new(
            MockGroupRepository::new(),
            MockGroupMembershipRepository::new(),
        );
        assert_eq!(
            action.join_public(99, 2).await.unwrap_err(),
            HearthError::NotFound
        );
    }

    #[tokio::test]
    async fn test_join_twice_rejected() {
        let group_repo = MockGroupRepository::new();
        let group = seed_group(&group_repo, GroupPrivacy::Public).await;

        let action = JoinGroupAction::new(group_repo, MockGroupMembershipRepository::new());
        action.join_public(group.id, 2).await.unwrap();
        assert_eq!(
            action.join_public(group.id, 2).await.unwrap_err(),
            HearthError::AlreadyMember
        );
    }

    #[tokio::test]
    async fn test_join_with_code_ignores_privacy() {
        let group_repo = MockGroupRepository::new();
        let group = seed_group(&group_repo, GroupPrivacy::Private).await;

        let action = JoinGroupAction::new(group_repo, MockGroupMembershipRepository::new());
        let joined = action.join_with_code(&group.invite_code, 2).await.unwrap();
        assert_eq!(joined.id, group.id);
    }

    #[tokio::test]
    async fn test_join_with_unknown_code() {
        let group_repo = MockGroupRepository::new();
        seed_group(&group_repo, GroupPrivacy::Private).await;

        let action = JoinGroupAction::new(group_repo, MockGroupMembershipRepository::new());
        assert_eq!(
            action.join_with_code("deadbeef", 2).await.unwrap_err(),
            HearthError::NotFound
        );
    }
}
