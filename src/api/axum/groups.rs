//! Group and membership handlers.
//!
//! Role guards run before any mutation; every role decision goes through
//! [`crate::access::effective_role`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::routes::AppState;
use crate::access::{effective_role, EffectiveRole};
use crate::api::{
    CreateGroupRequest, GroupDetailResponse, GroupResponse, InviteMemberRequest, MemberResponse,
    MessageResponse, SearchParams, UpdateGroupRequest, UpdateMemberRoleRequest,
};
use crate::groups::{
    CreateGroupAction, CreateGroupInput, DeleteGroupAction, Group, GroupMembershipRepository,
    GroupPrivacy, GroupRepository, InviteMemberAction, JoinGroupAction,
};
use crate::recipes::RecipeRepository;
use crate::users::{TokenRepository, UserRepository};
use crate::validators::{validate_email, validate_group_description, validate_group_name};
use crate::{FieldErrors, HearthError};

async fn load_group<G: GroupRepository>(group_repo: &G, id: i64) -> Result<Group, AppError> {
    group_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError(HearthError::NotFound))
}

async fn role_in<M: GroupMembershipRepository>(
    membership_repo: &M,
    group: &Group,
    user_id: i64,
) -> Result<EffectiveRole, AppError> {
    let membership = membership_repo
        .find_by_group_and_user(group.id, user_id)
        .await?;
    Ok(effective_role(group, membership.as_ref(), user_id))
}

fn require_member(role: EffectiveRole) -> Result<(), AppError> {
    if role == EffectiveRole::None {
        return Err(AppError(HearthError::Forbidden(
            "You are not a member of this group".to_owned(),
        )));
    }
    Ok(())
}

fn require_admin(role: EffectiveRole) -> Result<(), AppError> {
    require_member(role)?;
    if role < EffectiveRole::Admin {
        return Err(AppError(HearthError::Forbidden(
            "You must be a group admin to perform this action".to_owned(),
        )));
    }
    Ok(())
}

fn validate_group_fields(name: Option<&str>, description: Option<&str>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(name) = name {
        errors.check("name", validate_group_name(name));
    }
    if let Some(description) = description {
        errors.check("description", validate_group_description(description));
    }
    errors.into_result().map_err(AppError)
}

pub async fn create_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    validate_group_fields(Some(&body.name), Some(&body.description))?;

    let action = CreateGroupAction::new(state.group_repo.clone(), state.membership_repo.clone());
    let group = action
        .execute(
            user.user().id,
            CreateGroupInput {
                name: body.name.trim().to_owned(),
                description: body.description.trim().to_owned(),
                privacy: body.privacy.unwrap_or(GroupPrivacy::Public),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

pub async fn list_my_groups<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let memberships = state.membership_repo.find_by_user(user.user().id).await?;

    let mut groups = Vec::with_capacity(memberships.len());
    for membership in memberships {
        if let Some(group) = state.group_repo.find_by_id(membership.group_id).await? {
            groups.push(GroupResponse::from(group));
        }
    }

    Ok(Json(groups))
}

pub async fn search_public_groups<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    _user: AuthenticatedUser<U, T>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let groups = state.group_repo.search_public(params.search.as_deref()).await?;
    let responses: Vec<GroupResponse> = groups.into_iter().map(GroupResponse::from).collect();

    Ok(Json(responses))
}

async fn group_detail<U, M>(
    user_repo: &U,
    membership_repo: &M,
    group: Group,
) -> Result<GroupDetailResponse, AppError>
where
    U: UserRepository,
    M: GroupMembershipRepository,
{
    let members = membership_repo.find_by_group(group.id).await?;

    let mut responses = Vec::with_capacity(members.len());
    for member in members {
        if let Some(member_user) = user_repo.find_by_id(member.user_id).await? {
            responses.push(MemberResponse::from_parts(member, &member_user));
        }
    }

    Ok(GroupDetailResponse {
        group: GroupResponse::from(group),
        members: responses,
    })
}

pub async fn get_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_member(role)?;

    let detail = group_detail(&state.user_repo, &state.membership_repo, group).await?;
    Ok(Json(detail))
}

pub async fn update_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
    Json(body): Json<UpdateGroupRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_admin(role)?;

    validate_group_fields(body.name.as_deref(), body.description.as_deref())?;

    let updated = state
        .group_repo
        .update(
            group_id,
            body.name.as_deref().map(str::trim),
            body.description.as_deref().map(str::trim),
            body.privacy,
        )
        .await?;

    Ok(Json(GroupResponse::from(updated)))
}

pub async fn delete_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = DeleteGroupAction::new(state.group_repo.clone(), state.recipe_repo.clone());
    action.execute(user.user(), group_id).await?;

    Ok(Json(MessageResponse {
        message: "Group deleted successfully".to_owned(),
    }))
}

pub async fn join_public_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = JoinGroupAction::new(state.group_repo.clone(), state.membership_repo.clone());
    let group = action.join_public(group_id, user.user().id).await?;

    Ok(Json(GroupResponse::from(group)))
}

pub async fn join_via_invite<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(invite_code): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = JoinGroupAction::new(state.group_repo.clone(), state.membership_repo.clone());
    let group = action.join_with_code(&invite_code, user.user().id).await?;

    Ok(Json(GroupResponse::from(group)))
}

pub async fn leave_group<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;

    if group.creator_id == user.user().id {
        return Err(AppError(HearthError::CreatorCannotLeave));
    }

    if state
        .membership_repo
        .find_by_group_and_user(group.id, user.user().id)
        .await?
        .is_none()
    {
        return Err(AppError(HearthError::NotAMember));
    }

    state
        .membership_repo
        .delete(group.id, user.user().id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Successfully left group".to_owned(),
    }))
}

pub async fn list_members<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_member(role)?;

    let detail = group_detail(&state.user_repo, &state.membership_repo, group).await?;
    Ok(Json(detail.members))
}

pub async fn invite_member<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(group_id): Path<i64>,
    Json(body): Json<InviteMemberRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_admin(role)?;

    let mut errors = FieldErrors::new();
    errors.check("email", validate_email(&body.email));
    errors.into_result()?;

    let action = InviteMemberAction::new(
        state.user_repo.clone(),
        state.group_repo.clone(),
        state.membership_repo.clone(),
    );
    action.execute(group_id, &body.email).await?;

    Ok(Json(MessageResponse {
        message: "User invited successfully".to_owned(),
    }))
}

pub async fn update_member_role<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path((group_id, target_user_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_admin(role)?;

    // the creator is always an admin member; demoting them would break that
    if target_user_id == group.creator_id {
        return Err(AppError(HearthError::Forbidden(
            "The group creator must remain an admin".to_owned(),
        )));
    }

    let updated = state
        .membership_repo
        .update_role(group_id, target_user_id, body.role)
        .await?;

    Ok(Json(updated))
}

pub async fn remove_member<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path((group_id, target_user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let group = load_group(&state.group_repo, group_id).await?;
    let role = role_in(&state.membership_repo, &group, user.user().id).await?;
    require_admin(role)?;

    if target_user_id == group.creator_id {
        return Err(AppError(HearthError::CannotRemoveCreator));
    }

    if state
        .membership_repo
        .find_by_group_and_user(group_id, target_user_id)
        .await?
        .is_none()
    {
        return Err(AppError(HearthError::NotAMember));
    }

    state
        .membership_repo
        .delete(group_id, target_user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Member removed successfully".to_owned(),
    }))
}
