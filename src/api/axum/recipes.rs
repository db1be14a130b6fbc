//! Recipe handlers.
//!
//! Visibility decisions are delegated to [`crate::access`]; handlers fetch
//! the membership context and pass it in. Group-visibility writes re-check
//! the whole final group set, and a non-`group` visibility always clears
//! the owning set.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::middleware::{AuthenticatedUser, MaybeUser};
use super::routes::AppState;
use crate::access::{
    can_delete_recipe, can_edit_recipe, can_view_recipe, check_group_publish, effective_role,
    recipe_scope, EffectiveRole, ListFilter,
};
use crate::api::{
    CreateRecipeRequest, FavoriteResponse, ListRecipesParams, MessageResponse, RateRecipeRequest,
    RatingResponse, RecipeResponse, UpdateRecipeRequest,
};
use crate::groups::{GroupMembershipRepository, GroupRepository};
use crate::recipes::{
    CreateRecipe, KosherType, Recipe, RecipeQuery, RecipeRepository, RecipeSort, UpdateRecipe,
    Visibility,
};
use crate::users::{TokenRepository, User, UserRepository};
use crate::validators::{
    validate_difficulty, validate_ingredients, validate_instructions, validate_prep_time,
    validate_rating, validate_recipe_category, validate_recipe_title, ValidationError,
};
use crate::{FieldErrors, HearthError};

async fn member_group_ids<M: GroupMembershipRepository>(
    membership_repo: &M,
    user: Option<&User>,
) -> Result<Vec<i64>, AppError> {
    match user {
        Some(user) => {
            let memberships = membership_repo.find_by_user(user.id).await?;
            Ok(memberships.into_iter().map(|m| m.group_id).collect())
        }
        None => Ok(vec![]),
    }
}

/// The recipe's owning groups in which the user is an effective admin.
async fn admin_group_ids<G, M>(
    group_repo: &G,
    membership_repo: &M,
    recipe: &Recipe,
    user: &User,
) -> Result<Vec<i64>, AppError>
where
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    let mut admin_ids = Vec::new();
    for group_id in &recipe.group_ids {
        if let Some(group) = group_repo.find_by_id(*group_id).await? {
            let membership = membership_repo
                .find_by_group_and_user(group.id, user.id)
                .await?;
            if effective_role(&group, membership.as_ref(), user.id) == EffectiveRole::Admin {
                admin_ids.push(group.id);
            }
        }
    }
    Ok(admin_ids)
}

/// Loads each target group with the requester's membership and runs the
/// publish check: exists, member, contributor-or-admin.
async fn check_publish_targets<G, M>(
    group_repo: &G,
    membership_repo: &M,
    user: &User,
    group_ids: &[i64],
) -> Result<(), AppError>
where
    G: GroupRepository,
    M: GroupMembershipRepository,
{
    let mut entries = Vec::with_capacity(group_ids.len());
    for group_id in group_ids {
        let group = group_repo
            .find_by_id(*group_id)
            .await?
            .ok_or(AppError(HearthError::GroupNotFound(*group_id)))?;
        let membership = membership_repo
            .find_by_group_and_user(group.id, user.id)
            .await?;
        entries.push((group, membership));
    }

    check_group_publish(user, &entries).map_err(AppError)
}

/// Resolves the stored group set from the final visibility: anything other
/// than `group` clears it, `group` requires a non-empty set.
fn resolve_group_scope(
    visibility: Visibility,
    group_ids: Vec<i64>,
) -> Result<Vec<i64>, AppError> {
    if visibility != Visibility::Group {
        return Ok(vec![]);
    }
    if group_ids.is_empty() {
        let mut errors = FieldErrors::new();
        errors.push("groupIds", ValidationError::GroupIdsEmpty);
        return Err(AppError(HearthError::Validation(errors)));
    }
    Ok(group_ids)
}

fn parse_sort(sort_by: Option<&str>) -> RecipeSort {
    match sort_by {
        Some("title") => RecipeSort::Title,
        Some("rating") => RecipeSort::Rating,
        Some("prepTime") => RecipeSort::PrepTime,
        _ => RecipeSort::Newest,
    }
}

fn parse_csv_difficulties(csv: Option<&str>) -> Vec<u8> {
    csv.map(|s| {
        s.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_csv_kosher(csv: Option<&str>) -> Vec<KosherType> {
    csv.map(|s| {
        s.split(',')
            .filter_map(|part| KosherType::parse(part.trim()))
            .collect()
    })
    .unwrap_or_default()
}

pub async fn list_recipes<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: MaybeUser<U, T>,
    Query(params): Query<ListRecipesParams>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let filter = params.filter.as_deref().and_then(ListFilter::parse);
    let group_ids = member_group_ids(&state.membership_repo, user.user()).await?;
    let scope = recipe_scope(user.user(), filter, group_ids)?;

    let query = RecipeQuery {
        scope,
        category: params.category,
        search: params.search,
        min_time: params.min_time,
        max_time: params.max_time,
        difficulties: parse_csv_difficulties(params.difficulty.as_deref()),
        kosher_types: parse_csv_kosher(params.kosher_type.as_deref()),
        yemeni_only: params.is_yemeni.as_deref() == Some("true"),
        sort: parse_sort(params.sort_by.as_deref()),
    };

    let recipes = state.recipe_repo.list(&query).await?;
    let responses: Vec<RecipeResponse> = recipes.into_iter().map(RecipeResponse::from).collect();

    Ok(Json(responses))
}

pub async fn list_categories<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let categories = state.recipe_repo.categories().await?;
    Ok(Json(categories))
}

pub async fn get_recipe<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: MaybeUser<U, T>,
    Path(recipe_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError(HearthError::NotFound))?;

    let group_ids = member_group_ids(&state.membership_repo, user.user()).await?;
    can_view_recipe(user.user(), &recipe, &group_ids)?;

    Ok(Json(RecipeResponse::from(recipe)))
}

fn validate_recipe_fields(
    title: Option<&str>,
    category: Option<&str>,
    ingredients: Option<&[String]>,
    instructions: Option<&[String]>,
    prep_time: Option<u32>,
    difficulty: Option<u8>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(title) = title {
        errors.check("title", validate_recipe_title(title));
    }
    if let Some(category) = category {
        errors.check("category", validate_recipe_category(category));
    }
    if let Some(ingredients) = ingredients {
        errors.check("ingredients", validate_ingredients(ingredients));
    }
    if let Some(instructions) = instructions {
        errors.check("instructions", validate_instructions(instructions));
    }
    if let Some(prep_time) = prep_time {
        errors.check("prepTime", validate_prep_time(prep_time));
    }
    if let Some(difficulty) = difficulty {
        errors.check("difficulty", validate_difficulty(difficulty));
    }
    errors.into_result().map_err(AppError)
}

pub async fn create_recipe<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    validate_recipe_fields(
        Some(&body.title),
        Some(&body.category),
        Some(&body.ingredients),
        Some(&body.instructions),
        Some(body.prep_time),
        Some(body.difficulty),
    )?;

    let visibility = body.visibility.unwrap_or(Visibility::Public);
    let group_ids = resolve_group_scope(visibility, body.group_ids)?;

    if visibility == Visibility::Group {
        check_publish_targets(
            &state.group_repo,
            &state.membership_repo,
            user.user(),
            &group_ids,
        )
        .await?;
    }

    let recipe = state
        .recipe_repo
        .create(CreateRecipe {
            title: body.title.trim().to_owned(),
            category: body.category.trim().to_owned(),
            ingredients: body.ingredients,
            instructions: body.instructions,
            prep_time: body.prep_time,
            difficulty: body.difficulty,
            image_url: body.image_url,
            is_yemeni: body.is_yemeni,
            kosher_type: body.kosher_type.unwrap_or(KosherType::Parve),
            creator_id: Some(user.user().id),
            visibility,
            group_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}

pub async fn update_recipe<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(recipe_id): Path<i64>,
    Json(body): Json<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError(HearthError::NotFound))?;

    let admin_ids = admin_group_ids(
        &state.group_repo,
        &state.membership_repo,
        &recipe,
        user.user(),
    )
    .await?;
    can_edit_recipe(user.user(), &recipe, &admin_ids)?;

    validate_recipe_fields(
        body.title.as_deref(),
        body.category.as_deref(),
        body.ingredients.as_deref(),
        body.instructions.as_deref(),
        body.prep_time,
        body.difficulty,
    )?;

    let visibility = body.visibility.unwrap_or(recipe.visibility);
    let requested_groups = body.group_ids.unwrap_or_else(|| recipe.group_ids.clone());
    let group_ids = resolve_group_scope(visibility, requested_groups)?;

    // a recipe that stays (or becomes) group-visible re-validates the whole
    // final group set
    if visibility == Visibility::Group {
        check_publish_targets(
            &state.group_repo,
            &state.membership_repo,
            user.user(),
            &group_ids,
        )
        .await?;
    }

    let updated = state
        .recipe_repo
        .update(
            recipe_id,
            UpdateRecipe {
                title: body.title.map(|t| t.trim().to_owned()),
                category: body.category.map(|c| c.trim().to_owned()),
                ingredients: body.ingredients,
                instructions: body.instructions,
                prep_time: body.prep_time,
                difficulty: body.difficulty,
                image_url: body.image_url.map(Some),
                is_yemeni: body.is_yemeni,
                kosher_type: body.kosher_type,
                visibility,
                group_ids,
            },
        )
        .await?;

    Ok(Json(RecipeResponse::from(updated)))
}

pub async fn delete_recipe<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(recipe_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError(HearthError::NotFound))?;

    can_delete_recipe(user.user(), &recipe)?;

    state.recipe_repo.delete(recipe_id).await?;

    Ok(Json(MessageResponse {
        message: "Recipe deleted successfully".to_owned(),
    }))
}

pub async fn rate_recipe<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(recipe_id): Path<i64>,
    Json(body): Json<RateRecipeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let mut errors = FieldErrors::new();
    errors.check("rating", validate_rating(body.rating));
    errors.into_result()?;

    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError(HearthError::NotFound))?;

    // rating requires view access, not just authentication
    let group_ids = member_group_ids(&state.membership_repo, Some(user.user())).await?;
    can_view_recipe(Some(user.user()), &recipe, &group_ids)?;

    let average_rating = state
        .recipe_repo
        .rate(recipe_id, user.user().id, body.rating)
        .await?;

    Ok(Json(RatingResponse {
        message: "Rating saved successfully".to_owned(),
        average_rating,
    }))
}

pub async fn toggle_favorite<U, T, G, M, R>(
    State(state): State<AppState<U, T, G, M, R>>,
    user: AuthenticatedUser<U, T>,
    Path(recipe_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError(HearthError::NotFound))?;

    // favoriting requires view access, not just authentication
    let group_ids = member_group_ids(&state.membership_repo, Some(user.user())).await?;
    can_view_recipe(Some(user.user()), &recipe, &group_ids)?;

    let user_id = user.user().id;
    if state.user_repo.is_favorite(user_id, recipe_id).await? {
        state.user_repo.remove_favorite(user_id, recipe_id).await?;
        Ok(Json(FavoriteResponse {
            message: "Removed from favorites".to_owned(),
            is_favorite: false,
        }))
    } else {
        state.user_repo.add_favorite(user_id, recipe_id).await?;
        Ok(Json(FavoriteResponse {
            message: "Added to favorites".to_owned(),
            is_favorite: true,
        }))
    }
}
