use crate::groups::{CreateMember, GroupMember, GroupMembershipRepository, GroupRepository, GroupRole};
use crate::users::UserRepository;
use crate::HearthError;

/// Action to invite a user into a group by email.
///
/// The invitee is added directly with role `member`; no pending-invitation
/// state exists. Admin-only, enforced by the route guard before this runs.
pub struct InviteMemberAction<U, G, M>
where
    U: UserRepository,
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    user_repo: U,
    group_repo: G,
    membership_repo: M,
}

impl<U, G, M> InviteMemberAction<U, G, M>
where
    U: UserRepository,
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    pub fn new(user_repo: U, group_repo: G, membership_repo: M) -> Self {
        Self {
            user_repo,
            group_repo,
            membership_repo,
        }
    }

    /// # Errors
    ///
    /// - `HearthError::NotFound` - group does not exist
    /// - `HearthError::UserNotFound` - no account with this email
    /// - `HearthError::AlreadyMember` - invitee already belongs to the group
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_member", skip_all, err)
    )]
    pub async fn execute(&self, group_id: i64, email: &str) -> Result<GroupMember, HearthError> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or(HearthError::NotFound)?;

        let invitee = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(HearthError::UserNotFound)?;

        if self
            .membership_repo
            .find_by_group_and_user(group.id, invitee.id)
            .await?
            .is_some()
        {
            return Err(HearthError::AlreadyMember);
        }

        let member = self
            .membership_repo
            .create(CreateMember {
                group_id: group.id,
                user_id: invitee.id,
                role: GroupRole::Member,
            })
            .await?;

        log::info!(
            target: "hearth",
            "msg=\"member invited\", group_id={}, user_id={}",
            group.id,
            invitee.id
        );

        Ok(member)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::groups::{CreateGroup, GroupPrivacy, MockGroupMembershipRepository, MockGroupRepository};
    use crate::users::{MockUserRepository, SystemRole};

    async fn setup() -> (
        MockUserRepository,
        MockGroupRepository,
        MockGroupMembershipRepository,
        i64,
    ) {
        let user_repo = MockUserRepository::new();
        let group_repo = MockGroupRepository::new();
        let membership_repo = MockGroupMembershipRepository::new();

        let group = group_repo
            .create(CreateGroup {
                name: "Family".into(),
                description: String::new(),
                privacy: GroupPrivacy::Private,
                creator_id: 1,
                invite_code: crate::crypto::generate_invite_code(),
            })
            .await
            .unwrap();

        (user_repo, group_repo, membership_repo, group.id)
    }

    #[tokio::test]
    async fn test_invite_by_email_adds_member() {
        let (user_repo, group_repo, membership_repo, group_id) = setup().await;
        let invitee = user_repo.seed_user("b@example.com", "B", SystemRole::User);

        let action = InviteMemberAction::new(user_repo, group_repo, membership_repo);
        let member = action.execute(group_id, "b@example.com").await.unwrap();

        assert_eq!(member.user_id, invitee.id);
        assert_eq!(member.role, GroupRole::Member);
    }

    #[tokio::test]
    async fn test_invite_unknown_email() {
        let (user_repo, group_repo, membership_repo, group_id) = setup().await;
        let action = InviteMemberAction::new(user_repo, group_repo, membership_repo);

        assert_eq!(
            action.execute(group_id, "ghost@example.com").await.unwrap_err(),
            HearthError::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_invite_existing_member() {
        let (user_repo, group_repo, membership_repo, group_id) = setup().await;
        user_repo.seed_user("b@example.com", "B", SystemRole::User);

        let action = InviteMemberAction::new(user_repo, group_repo, membership_repo);
        action.execute(group_id, "b@example.com").await.unwrap();

        assert_eq!(
            action.execute(group_id, "b@example.com").await.unwrap_err(),
            HearthError::AlreadyMember
        );
    }

    #[tokio::test]
    async fn test_invite_into_unknown_group() {
        let (user_repo, group_repo, membership_repo, _) = setup().await;
        user_repo.seed_user("b@example.com", "B", SystemRole::User);

        let action = InviteMemberAction::new(user_repo, group_repo, membership_repo);
        assert_eq!(
            action.execute(999, "b@example.com").await.unwrap_err(),
            HearthError::NotFound
        );
    }
}
