use crate::crypto::generate_invite_code;
use crate::groups::{
    CreateGroup, CreateMember, Group, GroupMembershipRepository, GroupPrivacy, GroupRepository,
    GroupRole,
};
use crate::HearthError;

/// Input data for creating a group. Fields are assumed validated.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
}

/// Action to create a group.
///
/// The requester becomes the creator and the sole member with role `admin`,
/// and the group receives a fresh random invite code. If the admin
/// membership cannot be written, the group row is removed again so the
/// creator-is-admin-member invariant is never observable broken.
pub struct CreateGroupAction<G, M>
where
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    group_repo: G,
    membership_repo: M,
}

impl<G: GroupRepository, M: GroupMembershipRepository> CreateGroupAction<G, M> {
    pub fn new(group_repo: G, membership_repo: M) -> Self {
        Self {
            group_repo,
            membership_repo,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_group", skip_all, err)
    )]
    pub async fn execute(&self, user_id: i64, input: CreateGroupInput) -> Result<Group, HearthError> {
        let data = CreateGroup {
            name: input.name,
            description: input.description,
            privacy: input.privacy,
            creator_id: user_id,
            invite_code: generate_invite_code(),
        };

        let group = self.group_repo.create(data).await?;

        let membership = CreateMember {
            group_id: group.id,
            user_id,
            role: GroupRole::Admin,
        };

        if let Err(err) = self.membership_repo.create(membership).await {
            // compensating delete keeps the invariant; surface the original error
            if let Err(cleanup_err) = self.group_repo.delete(group.id).await {
                log::error!(
                    target: "hearth",
                    "msg=\"failed to roll back group after membership error\", group_id={}, error=\"{cleanup_err}\"",
                    group.id
                );
            }
            return Err(err);
        }

        log::info!(
            target: "hearth",
            "msg=\"group created\", group_id={}, creator_id={}, privacy=\"{}\"",
            group.id,
            user_id,
            group.privacy.as_str()
        );

        Ok(group)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::groups::{MockGroupMembershipRepository, MockGroupRepository};

    fn input() -> CreateGroupInput {
        CreateGroupInput {
            name: "Family".into(),
            description: "Grandma's kitchen".into(),
            privacy: GroupPrivacy::Private,
        }
    }

    #[tokio::test]
    async fn test_create_makes_creator_sole_admin() {
        let group_repo = MockGroupRepository::new();
        let membership_repo = MockGroupMembershipRepository::new();
        let action = CreateGroupAction::new(group_repo.clone(), membership_repo.clone());

        let group = action.execute(1, input()).await.unwrap();

        assert_eq!(group.creator_id, 1);
        assert_eq!(group.invite_code.len(), 32);

        let members = membership_repo.find_by_group(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, 1);
        assert_eq!(members[0].role, GroupRole::Admin);
    }

    #[tokio::test]
    async fn test_create_generates_distinct_invite_codes() {
        let action = CreateGroupAction::new(
            MockGroupRepository::new(),
            MockGroupMembershipRepository::new(),
        );

        let first = action.execute(1, input()).await.unwrap();
        let second = action.execute(1, input()).await.unwrap();
        assert_ne!(first.invite_code, second.invite_code);
    }
}
