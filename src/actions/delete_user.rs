use crate::groups::{GroupMembershipRepository, GroupRepository, GroupRole};
use crate::recipes::RecipeRepository;
use crate::users::{TokenRepository, User, UserRepository};
use crate::HearthError;

/// Action to delete a user account, sysadmin-only.
///
/// The cascade, in order:
/// 1. remove the target from every group's member list;
/// 2. for each group the target created, hand `creator` to another admin
///    member, else promote the earliest remaining member to admin and make
///    them creator, else (group now empty) delete the group through the
///    recipe cascade;
/// 3. orphan the target's recipes (creator cleared, recipes retained);
/// 4. revoke the target's access tokens;
/// 5. delete the user row.
pub struct DeleteUserAction<U, T, G, M, R>
where
    U: UserRepository,
    T: TokenRepository,
    G: GroupRepository,
    M: GroupMembershipRepository,
    R: RecipeRepository,
{
    user_repo: U,
    token_repo: T,
    group_repo: G,
    membership_repo: M,
    recipe_repo: R,
}

impl<U, T, G, M, R> DeleteUserAction<U, T, G, M, R>
where
    U: UserRepository,
    T: TokenRepository,
    G: GroupRepository,
    M: GroupMembershipRepository,
    R: RecipeRepository,
{
    pub fn new(user_repo: U, token_repo: T, group_repo: G, membership_repo: M, recipe_repo: R) -> Self {
        Self {
            user_repo,
            token_repo,
            group_repo,
            membership_repo,
            recipe_repo,
        }
    }

    /// # Errors
    ///
    /// - `HearthError::Forbidden` - requester is not a sysadmin
    /// - `HearthError::CannotDeleteSelf` - requester targeted themselves
    /// - `HearthError::UserNotFound` - target does not exist
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_user", skip_all, err)
    )]
    pub async fn execute(&self, requester: &User, target_id: i64) -> Result<(), HearthError> {
        if !requester.is_sysadmin() {
            return Err(HearthError::Forbidden(
                "Sysadmin role required to delete users".to_owned(),
            ));
        }

        if requester.id == target_id {
            return Err(HearthError::CannotDeleteSelf);
        }

        let target = self
            .user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(HearthError::UserNotFound)?;

        self.membership_repo.delete_by_user(target.id).await?;

        for group in self.group_repo.find_by_creator(target.id).await? {
            let members = self.membership_repo.find_by_group(group.id).await?;

            if let Some(admin) = members.iter().find(|m| m.role == GroupRole::Admin) {
                self.group_repo.set_creator(group.id, admin.user_id).await?;
            } else if let Some(first) = members.first() {
                self.membership_repo
                    .update_role(group.id, first.user_id, GroupRole::Admin)
                    .await?;
                self.group_repo.set_creator(group.id, first.user_id).await?;
            } else {
                // target was the sole member; the group goes away, recipes first
                self.recipe_repo.detach_group(group.id).await?;
                self.group_repo.delete(group.id).await?;
            }
        }

        self.recipe_repo.orphan_creator(target.id).await?;
        self.token_repo.revoke_all_user_tokens(target.id).await?;
        self.user_repo.delete(target.id).await?;

        log::info!(
            target: "hearth",
            "msg=\"user deleted\", user_id={}, deleted_by={}",
            target.id,
            requester.id
        );

        Ok(())
    }
}
