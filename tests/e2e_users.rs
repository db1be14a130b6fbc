//! End-to-end tests for authentication and sysadmin user management.
//!
//! These tests drive the axum router against mock repositories - no
//! database required.

#![cfg(all(feature = "axum_api", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use hearth::api::axum::{router, AppState};
use hearth::groups::{GroupRepository, MockGroupMembershipRepository, MockGroupRepository};
use hearth::recipes::{MockRecipeRepository, RecipeRepository};
use hearth::users::{MockTokenRepository, MockUserRepository, SystemRole, TokenRepository, UserRepository};

type MockState = AppState<
    MockUserRepository,
    MockTokenRepository,
    MockGroupRepository,
    MockGroupMembershipRepository,
    MockRecipeRepository,
>;

fn create_app() -> (Router, MockState) {
    let state = MockState {
        user_repo: MockUserRepository::new(),
        token_repo: MockTokenRepository::new(),
        group_repo: MockGroupRepository::new(),
        membership_repo: MockGroupMembershipRepository::new(),
        recipe_repo: MockRecipeRepository::new(),
    };
    let app = router().with_state(state.clone());
    (app, state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn signup(app: &Router, email: &str, name: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "name": name,
            "password": "securepassword"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (_, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "securepassword"
        })),
    )
    .await;
    let token = body["token"].as_str().unwrap().to_owned();

    (id, token)
}

async fn seed_sysadmin(state: &MockState) -> (i64, String) {
    let user = state
        .user_repo
        .seed_user("root@example.com", "Root", SystemRole::Sysadmin);
    let token = state
        .token_repo
        .create_token(user.id, Utc::now() + Duration::days(1))
        .await
        .unwrap();
    (user.id, token.token)
}

#[tokio::test]
async fn test_register_rejects_bad_input_and_duplicates() {
    let (app, _state) = create_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": "notanemail",
            "name": "",
            "password": "short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["email"].is_string());
    assert!(body["fields"]["name"].is_string());
    assert!(body["fields"]["password"].is_string());

    signup(&app, "a@example.com", "A").await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": "a@example.com",
            "name": "A again",
            "password": "securepassword"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_login_failures() {
    let (app, _state) = create_app();
    signup(&app, "a@example.com", "A").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({
            "email": "a@example.com",
            "password": "wrongpassword"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({
            "email": "ghost@example.com",
            "password": "securepassword"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _state) = create_app();
    let (_, token) = signup(&app, "a@example.com", "A").await;

    let (status, _) = send(&app, "GET", "/groups", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/groups", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_list_users_is_sysadmin_only() {
    let (app, state) = create_app();
    let (_, user_token) = signup(&app, "a@example.com", "A").await;
    let (_, root_token) = seed_sysadmin(&state).await;

    let (status, _) = send(&app, "GET", "/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/users", Some(&root_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    // password hashes never leave the server
    assert!(body[0].get("hashed_password").is_none());
}

#[tokio::test]
async fn test_sysadmin_updates_role() {
    let (app, state) = create_app();
    let (a_id, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, root_token) = seed_sysadmin(&state).await;

    let uri = format!("/users/{a_id}");

    // a regular user may not promote anyone
    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&a_token),
        Some(serde_json::json!({"role": "sysadmin"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&root_token),
        Some(serde_json::json!({"role": "sysadmin", "name": "Admin A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "sysadmin");
    assert_eq!(body["name"], "Admin A");

    // the promoted user now passes sysadmin guards
    let (status, _) = send(&app, "GET", "/users", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user_guards() {
    let (app, state) = create_app();
    let (a_id, a_token) = signup(&app, "a@example.com", "A").await;
    let (root_id, root_token) = seed_sysadmin(&state).await;

    // non-sysadmin
    let (status, _) = send(&app, "DELETE", &format!("/users/{a_id}"), Some(&a_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // self-deletion
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/users/{root_id}"),
        Some(&root_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CANNOT_DELETE_SELF");

    // unknown target
    let (status, _) = send(&app, "DELETE", "/users/9999", Some(&root_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_cascade() {
    let (app, state) = create_app();
    let (a_id, a_token) = signup(&app, "a@example.com", "A").await;
    let (b_id, b_token) = signup(&app, "b@example.com", "B").await;
    let (_, root_token) = seed_sysadmin(&state).await;

    // A creates a group with B as a second admin, plus a solo group with a
    // group-only recipe in it
    let (_, shared) = send(
        &app,
        "POST",
        "/groups",
        Some(&a_token),
        Some(serde_json::json!({"name": "Shared Kitchen", "privacy": "public"})),
    )
    .await;
    let shared_id = shared["id"].as_i64().unwrap();
    send(&app, "POST", &format!("/groups/{shared_id}/join"), Some(&b_token), None).await;
    send(
        &app,
        "PUT",
        &format!("/groups/{shared_id}/members/{b_id}"),
        Some(&a_token),
        Some(serde_json::json!({"role": "admin"})),
    )
    .await;

    let (_, solo) = send(
        &app,
        "POST",
        "/groups",
        Some(&a_token),
        Some(serde_json::json!({"name": "Solo Corner", "privacy": "private"})),
    )
    .await;
    let solo_id = solo["id"].as_i64().unwrap();

    let (_, recipe) = send(
        &app,
        "POST",
        "/recipes",
        Some(&a_token),
        Some(serde_json::json!({
            "title": "Solo Special",
            "category": "Soups",
            "ingredients": ["broth"],
            "instructions": ["simmer"],
            "prepTime": 30,
            "difficulty": 1,
            "visibility": "group",
            "groupIds": [solo_id]
        })),
    )
    .await;
    let recipe_id = recipe["id"].as_i64().unwrap();

    // sysadmin deletes A
    let (status, _) = send(&app, "DELETE", &format!("/users/{a_id}"), Some(&root_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // A's token is gone with the account
    let (status, _) = send(&app, "GET", "/groups", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // the shared group was transferred to the remaining admin
    let (_, detail) = send(&app, "GET", &format!("/groups/{shared_id}"), Some(&b_token), None).await;
    assert_eq!(detail["creatorId"].as_i64().unwrap(), b_id);
    let members = detail["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["userId"].as_i64().unwrap(), b_id);

    // the solo group is gone and its recipe was privatized and orphaned
    assert!(state.group_repo.find_by_id(solo_id).await.unwrap().is_none());
    let recipe = state
        .recipe_repo
        .find_by_id(recipe_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recipe.visibility, hearth::recipes::Visibility::Private);
    assert!(recipe.group_ids.is_empty());
    assert_eq!(recipe.creator_id, None);

    // the account itself is gone
    assert!(state.user_repo.find_by_id(a_id).await.unwrap().is_none());
}
