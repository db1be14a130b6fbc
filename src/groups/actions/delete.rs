use crate::groups::GroupRepository;
use crate::recipes::RecipeRepository;
use crate::users::User;
use crate::HearthError;

/// Action to delete a group, creator-only.
///
/// Runs the recipe cascade first: the group is stripped from every
/// recipe's owning set, and recipes left group-visible with no groups are
/// flipped to `private`. Only then is the group row removed, so an
/// interrupted deletion can never leave a recipe pointing at a group that
/// no longer exists.
pub struct DeleteGroupAction<G, R>
where
    G: GroupRepository,
    R: RecipeRepository,
{
    group_repo: G,
    recipe_repo: R,
}

impl<G: GroupRepository, R: RecipeRepository> DeleteGroupAction<G, R> {
    pub fn new(group_repo: G, recipe_repo: R) -> Self {
        Self {
            group_repo,
            recipe_repo,
        }
    }

    /// # Errors
    ///
    /// - `HearthError::NotFound` - group does not exist
    /// - `HearthError::Forbidden` - requester is not the creator
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_group", skip_all, err)
    )]
    pub async fn execute(&self, requester: &User, group_id: i64) -> Result<(), HearthError> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or(HearthError::NotFound)?;

        if group.creator_id != requester.id {
            return Err(HearthError::Forbidden(
                "Only the group creator can perform this action".to_owned(),
            ));
        }

        self.recipe_repo.detach_group(group.id).await?;
        self.group_repo.delete(group.id).await?;

        log::info!(
            target: "hearth",
            "msg=\"group deleted\", group_id={}, creator_id={}",
            group.id,
            requester.id
        );

        Ok(())
    }
}
