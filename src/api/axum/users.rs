//! Auth and user-administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::routes::AppState;
use crate::actions::{DeleteUserAction, LoginAction, LogoutAction, RegisterAction};
use crate::api::{
    AuthResponse, LoginRequest, MessageResponse, RecipeResponse, RegisterRequest,
    UpdateUserRequest, UserResponse,
};
use crate::groups::{GroupMembershipRepository, GroupRepository};
use crate::recipes::RecipeRepository;
use crate::users::{TokenRepository, User, UserRepository};
use crate::validators::validate_email;
use crate::{FieldErrors, HearthError, SecretString};

fn require_sysadmin(user: &User) -> Result<(), AppError> {
    if user.is_sysadmin() {
        Ok(())
    } else {
        Err(AppError(HearthError::Forbidden(
            "Sysadmin role required".to_owned(),
        )))
    }
}

pub async fn register<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = RegisterAction::new(state.user_repo.clone());
    let user = action.execute(&body.email, &body.name, &body.password).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = LoginAction::new(state.user_repo.clone(), state.token_repo.clone());
    let (user, token) = action.execute(&body.email, &body.password).await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token: SecretString::new(token.token),
        expires_at: token.expires_at,
    }))
}

pub async fn logout<U, T, G, M, R>(
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
    LogoutAction::new(state.token_repo.clone())
        .execute(user.token())
        .await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_owned(),
    }))
}

pub async fn list_users<U, T, G, M, R>(
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
    require_sysadmin(user.user())?;

    let users = state.user_repo.list().await?;
    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(responses))
}

pub async fn update_user<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(target_id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    require_sysadmin(user.user())?;

    let mut errors = FieldErrors::new();
    if let Some(email) = &body.email {
        errors.check("email", validate_email(email));
    }
    errors.into_result()?;

    let updated = state
        .user_repo
        .update(
            target_id,
            body.email.as_deref(),
            body.name.as_deref(),
            body.role,
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

pub async fn delete_user<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let action = DeleteUserAction::new(
        state.user_repo.clone(),
        state.token_repo.clone(),
        state.group_repo.clone(),
        state.membership_repo.clone(),
        state.recipe_repo.clone(),
    );
    action.execute(user.user(), target_id).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_owned(),
    }))
}

pub async fn list_favorites<U, T, G, M, R>(
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
    let ids = state.user_repo.list_favorite_ids(user.user().id).await?;
    let recipes = state.recipe_repo.find_by_ids(&ids).await?;
    let responses: Vec<RecipeResponse> = recipes.into_iter().map(RecipeResponse::from).collect();

    Ok(Json(responses))
}
