//! Access-control evaluator.
//!
//! Pure decision logic: every function takes the requesting identity (or
//! none), the target, and pre-fetched membership context, and returns
//! allow/deny. No ambient request state and no store access; handlers look
//! the context up and pass it in.

use crate::groups::{Group, GroupMember, GroupRole};
use crate::recipes::{Recipe, RecipeScope, Visibility};
use crate::users::User;
use crate::HearthError;

/// A user's effective privilege within one group.
///
/// The group creator is always `Admin`, whatever their stored membership
/// row says. All role decisions route through this to keep call sites from
/// drifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectiveRole {
    None,
    Member,
    Contributor,
    Admin,
}

impl From<GroupRole> for EffectiveRole {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Member => Self::Member,
            GroupRole::Contributor => Self::Contributor,
            GroupRole::Admin => Self::Admin,
        }
    }
}

pub fn effective_role(group: &Group, membership: Option<&GroupMember>, user_id: i64) -> EffectiveRole {
    if group.creator_id == user_id {
        return EffectiveRole::Admin;
    }
    match membership {
        Some(m) if m.group_id == group.id && m.user_id == user_id => m.role.into(),
        _ => EffectiveRole::None,
    }
}

/// Decides whether the requester may view a single recipe.
///
/// `member_group_ids` are the ids of every group the requester belongs to;
/// ignored for public recipes and anonymous requesters.
///
/// Denials for an existing recipe are authentication/authorization errors,
/// never not-found: existence is not concealed once the recipe was looked
/// up.
pub fn can_view_recipe(
    user: Option<&User>,
    recipe: &Recipe,
    member_group_ids: &[i64],
) -> Result<(), HearthError> {
    if recipe.visibility == Visibility::Public {
        return Ok(());
    }

    let user = user.ok_or(HearthError::AuthenticationRequired)?;

    if user.is_sysadmin() {
        return Ok(());
    }

    match recipe.visibility {
        Visibility::Private => {
            if recipe.creator_id == Some(user.id) {
                Ok(())
            } else {
                Err(HearthError::Forbidden(
                    "You do not have access to this recipe".to_owned(),
                ))
            }
        }
        Visibility::Group => {
            if recipe.shared_with_any(member_group_ids) {
                Ok(())
            } else {
                Err(HearthError::Forbidden(
                    "You do not have access to this recipe".to_owned(),
                ))
            }
        }
        Visibility::Public => Ok(()),
    }
}

/// Decides whether the requester may edit a recipe.
///
/// `admin_group_ids` are the recipe's owning groups in which the requester
/// holds effective `admin`; only consulted for group-visible recipes.
pub fn can_edit_recipe(
    user: &User,
    recipe: &Recipe,
    admin_group_ids: &[i64],
) -> Result<(), HearthError> {
    if user.is_sysadmin() {
        return Ok(());
    }

    if recipe.creator_id == Some(user.id) {
        return Ok(());
    }

    if recipe.visibility == Visibility::Group && recipe.shared_with_any(admin_group_ids) {
        return Ok(());
    }

    Err(HearthError::Forbidden(
        "You do not have permission to edit this recipe".to_owned(),
    ))
}

/// Decides whether the requester may delete a recipe. Unlike editing, group
/// admins get no say here: only the creator or a sysadmin.
pub fn can_delete_recipe(user: &User, recipe: &Recipe) -> Result<(), HearthError> {
    if user.is_sysadmin() || recipe.creator_id == Some(user.id) {
        return Ok(());
    }

    Err(HearthError::Forbidden(
        "You do not have permission to delete this recipe".to_owned(),
    ))
}

/// The `filter` query parameter of the recipe listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    Mine,
    MyGroups,
    Public,
}

impl ListFilter {
    /// Unknown values fall through to the default listing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mine" => Some(Self::Mine),
            "mygroups" => Some(Self::MyGroups),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// Computes the access scope of a listing request.
///
/// `mine` and `mygroups` require authentication. Anonymous requesters and
/// the explicit `public` filter see public recipes only. An authenticated
/// default listing is the union of public recipes, the requester's own, and
/// group recipes shared with the requester's groups — one OR-predicate, so
/// each matching recipe appears exactly once.
pub fn recipe_scope(
    user: Option<&User>,
    filter: Option<ListFilter>,
    member_group_ids: Vec<i64>,
) -> Result<RecipeScope, HearthError> {
    match filter {
        Some(ListFilter::Mine) => {
            let user = user.ok_or(HearthError::AuthenticationRequired)?;
            Ok(RecipeScope::Mine { user_id: user.id })
        }
        Some(ListFilter::MyGroups) => {
            user.ok_or(HearthError::AuthenticationRequired)?;
            Ok(RecipeScope::MemberGroups {
                group_ids: member_group_ids,
            })
        }
        Some(ListFilter::Public) => Ok(RecipeScope::Public),
        None => match user {
            Some(user) => Ok(RecipeScope::Accessible {
                user_id: user.id,
                group_ids: member_group_ids,
            }),
            None => Ok(RecipeScope::Public),
        },
    }
}

/// Checks that a recipe may be published into every one of the given
/// groups: the requester must be a member with role `contributor` or
/// `admin` in each. The offending group is named in the error. Callers map
/// missing groups to [`HearthError::GroupNotFound`] before calling.
pub fn check_group_publish(
    user: &User,
    groups: &[(Group, Option<GroupMember>)],
) -> Result<(), HearthError> {
    for (group, membership) in groups {
        let role = effective_role(group, membership.as_ref(), user.id);
        if role == EffectiveRole::None {
            return Err(HearthError::Forbidden(format!(
                "You are not a member of group: {}",
                group.name
            )));
        }
        if role < EffectiveRole::Contributor {
            return Err(HearthError::Forbidden(format!(
                "You need contributor or admin role in group: {}",
                group.name
            )));
        }
    }
    Ok(())
}
