//! Route configuration.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::{groups, recipes, users};
use crate::groups::{GroupMembershipRepository, GroupRepository};
use crate::recipes::RecipeRepository;
use crate::users::{TokenRepository, UserRepository};

/// Application state: one repository per store. Generic so the same
/// routers serve `SQLite` repositories in production and mocks in tests.
#[derive(Clone)]
pub struct AppState<U, T, G, M, R> {
    /// User store, including favorites.
    pub user_repo: U,
    /// Access-token store for bearer authentication.
    pub token_repo: T,
    /// Group store.
    pub group_repo: G,
    /// Group membership store.
    pub membership_repo: M,
    /// Recipe store.
    pub recipe_repo: R,
}

/// Builds the full application router.
///
/// # Routes
///
/// ## Auth
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login` - Issue a bearer token
/// - `POST /auth/logout` - Revoke the presented token
///
/// ## Recipes
/// - `GET /recipes` - List (optional auth; `filter`, `category`, `search`,
///   `sortBy`, `minTime`, `maxTime`, `difficulty`, `kosherType`, `isYemeni`)
/// - `GET /recipes/categories` - Distinct categories
/// - `GET /recipes/{id}` - Get one (optional auth, visibility-checked)
/// - `POST /recipes` - Create
/// - `PUT /recipes/{id}` - Update (creator, group admin, or sysadmin)
/// - `DELETE /recipes/{id}` - Delete (creator or sysadmin)
/// - `POST /recipes/{id}/rate` - Rate 0-5 (requires view access)
/// - `POST /recipes/{id}/favorite` - Toggle favorite (requires view access)
///
/// ## Groups
/// - `POST /groups` - Create (requester becomes creator/admin)
/// - `GET /groups` - Groups the requester belongs to
/// - `GET /groups/public` - Search public groups
/// - `GET /groups/{id}` - Detail with members (member-only)
/// - `PUT /groups/{id}` - Update metadata (admin)
/// - `DELETE /groups/{id}` - Delete with recipe cascade (creator)
/// - `POST /groups/{id}/join` - Join a public group
/// - `POST /groups/join/{invite_code}` - Join via invite code
/// - `POST /groups/{id}/leave` - Leave (creator blocked)
/// - `GET /groups/{id}/members` - Member list (member-only)
/// - `POST /groups/{id}/invite` - Add a user by email (admin)
/// - `PUT /groups/{id}/members/{user_id}` - Change a member's role (admin)
/// - `DELETE /groups/{id}/members/{user_id}` - Remove a member (admin)
///
/// ## Users
/// - `GET /users` - List accounts (sysadmin)
/// - `PUT /users/{id}` - Update email/name/system role (sysadmin)
/// - `DELETE /users/{id}` - Delete with cascade (sysadmin)
/// - `GET /users/favorites` - The requester's favorite recipes
pub fn router<U, T, G, M, R>() -> Router<AppState<U, T, G, M, R>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/recipes", recipe_routes())
        .nest("/groups", group_routes())
        .nest("/users", user_routes())
}

pub fn auth_routes<U, T, G, M, R>() -> Router<AppState<U, T, G, M, R>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(users::register::<U, T, G, M, R>))
        .route("/login", post(users::login::<U, T, G, M, R>))
        .route("/logout", post(users::logout::<U, T, G, M, R>))
}

pub fn recipe_routes<U, T, G, M, R>() -> Router<AppState<U, T, G, M, R>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(recipes::list_recipes::<U, T, G, M, R>))
        .route("/", post(recipes::create_recipe::<U, T, G, M, R>))
        .route("/categories", get(recipes::list_categories::<U, T, G, M, R>))
        .route("/{id}", get(recipes::get_recipe::<U, T, G, M, R>))
        .route("/{id}", put(recipes::update_recipe::<U, T, G, M, R>))
        .route("/{id}", delete(recipes::delete_recipe::<U, T, G, M, R>))
        .route("/{id}/rate", post(recipes::rate_recipe::<U, T, G, M, R>))
        .route(
            "/{id}/favorite",
            post(recipes::toggle_favorite::<U, T, G, M, R>),
        )
}

pub fn group_routes<U, T, G, M, R>() -> Router<AppState<U, T, G, M, R>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(groups::create_group::<U, T, G, M, R>))
        .route("/", get(groups::list_my_groups::<U, T, G, M, R>))
        .route("/public", get(groups::search_public_groups::<U, T, G, M, R>))
        .route("/join/{invite_code}", post(groups::join_via_invite::<U, T, G, M, R>))
        .route("/{id}", get(groups::get_group::<U, T, G, M, R>))
        .route("/{id}", put(groups::update_group::<U, T, G, M, R>))
        .route("/{id}", delete(groups::delete_group::<U, T, G, M, R>))
        .route("/{id}/join", post(groups::join_public_group::<U, T, G, M, R>))
        .route("/{id}/leave", post(groups::leave_group::<U, T, G, M, R>))
        .route("/{id}/members", get(groups::list_members::<U, T, G, M, R>))
        .route("/{id}/invite", post(groups::invite_member::<U, T, G, M, R>))
        .route(
            "/{id}/members/{user_id}",
            put(groups::update_member_role::<U, T, G, M, R>),
        )
        .route(
            "/{id}/members/{user_id}",
            delete(groups::remove_member::<U, T, G, M, R>),
        )
}

pub fn user_routes<U, T, G, M, R>() -> Router<AppState<U, T, G, M, R>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    G: GroupRepository + Clone + Send + Sync + 'static,
    M: GroupMembershipRepository + Clone + Send + Sync + 'static,
    R: RecipeRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(users::list_users::<U, T, G, M, R>))
        .route("/favorites", get(users::list_favorites::<U, T, G, M, R>))
        .route("/{id}", put(users::update_user::<U, T, G, M, R>))
        .route("/{id}", delete(users::delete_user::<U, T, G, M, R>))
}
