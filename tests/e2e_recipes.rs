//! End-to-end tests for recipe visibility, listing, rating, and favorites.
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
use hearth::groups::{MockGroupMembershipRepository, MockGroupRepository};
use hearth::recipes::MockRecipeRepository;
use hearth::users::{MockTokenRepository, MockUserRepository, SystemRole, TokenRepository};

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

async fn seed_sysadmin(state: &MockState) -> String {
    let user = state
        .user_repo
        .seed_user("root@example.com", "Root", SystemRole::Sysadmin);
    state
        .token_repo
        .create_token(user.id, Utc::now() + Duration::days(1))
        .await
        .unwrap()
        .token
}

fn recipe_body(title: &str, visibility: &str, group_ids: Vec<i64>) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "category": "Bread",
        "ingredients": ["flour", "water"],
        "instructions": ["mix", "bake"],
        "prepTime": 45,
        "difficulty": 2,
        "visibility": visibility,
        "groupIds": group_ids
    })
}

async fn create_recipe(
    app: &Router,
    token: &str,
    title: &str,
    visibility: &str,
    group_ids: Vec<i64>,
) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/recipes",
        Some(token),
        Some(recipe_body(title, visibility, group_ids)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_private_group(app: &Router, token: &str, name: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/groups",
        Some(token),
        Some(serde_json::json!({"name": name, "privacy": "private"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["id"].as_i64().unwrap(),
        body["inviteCode"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
async fn test_anonymous_listing_is_public_only() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (group_id, _) = create_private_group(&app, &a_token, "Family").await;

    create_recipe(&app, &a_token, "Public Bread", "public", vec![]).await;
    create_recipe(&app, &a_token, "Private Notes", "private", vec![]).await;
    create_recipe(&app, &a_token, "Family Special", "group", vec![group_id]).await;

    let (status, body) = send(&app, "GET", "/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Public Bread"]);
}

#[tokio::test]
async fn test_default_listing_is_union_without_duplicates() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, b_token) = signup(&app, "b@example.com", "B").await;
    let (group_id, code) = create_private_group(&app, &a_token, "Family").await;
    send(&app, "POST", &format!("/groups/join/{code}"), Some(&b_token), None).await;

    // A's recipes: own public one (matches both the public and the creator
    // clause), a private one, a group one
    create_recipe(&app, &a_token, "Public Bread", "public", vec![]).await;
    create_recipe(&app, &a_token, "A Private", "private", vec![]).await;
    create_recipe(&app, &a_token, "Family Special", "group", vec![group_id]).await;
    // B's private recipe is invisible to A
    create_recipe(&app, &b_token, "B Private", "private", vec![]).await;

    let (status, body) = send(&app, "GET", "/recipes", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let mut titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["A Private", "Family Special", "Public Bread"]);

    // B sees the public recipe, their own, and the group recipe
    let (_, body) = send(&app, "GET", "/recipes", Some(&b_token), None).await;
    let mut titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["B Private", "Family Special", "Public Bread"]);
}

#[tokio::test]
async fn test_listing_filters() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (group_id, _) = create_private_group(&app, &a_token, "Family").await;

    create_recipe(&app, &a_token, "Kubaneh", "public", vec![]).await;
    create_recipe(&app, &a_token, "Jachnun", "private", vec![]).await;
    create_recipe(&app, &a_token, "Saluf", "group", vec![group_id]).await;

    // filter=mine returns everything A created
    let (_, body) = send(&app, "GET", "/recipes?filter=mine", Some(&a_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    // filter=mygroups returns only group recipes from A's groups
    let (_, body) = send(&app, "GET", "/recipes?filter=mygroups", Some(&a_token), None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Saluf"]);

    // filter=public hides private recipes even from their creator
    let (_, body) = send(&app, "GET", "/recipes?filter=public", Some(&a_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // mine and mygroups require authentication
    let (status, _) = send(&app, "GET", "/recipes?filter=mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/recipes?filter=mygroups", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_content_filters_and_sort() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;

    let mut easy = recipe_body("Zhug", "public", vec![]);
    easy["category"] = "Condiments".into();
    easy["difficulty"] = 1.into();
    easy["isYemeni"] = true.into();
    send(&app, "POST", "/recipes", Some(&a_token), Some(easy)).await;

    let mut hard = recipe_body("Kubaneh", "public", vec![]);
    hard["difficulty"] = 4.into();
    hard["kosherType"] = "Dairy".into();
    send(&app, "POST", "/recipes", Some(&a_token), Some(hard)).await;

    let (_, body) = send(&app, "GET", "/recipes?category=Condiments", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/recipes?search=kub", None, None).await;
    assert_eq!(body[0]["title"], "Kubaneh");

    let (_, body) = send(&app, "GET", "/recipes?difficulty=1,2", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Zhug");

    let (_, body) = send(&app, "GET", "/recipes?kosherType=Dairy,Meat", None, None).await;
    assert_eq!(body[0]["title"], "Kubaneh");

    let (_, body) = send(&app, "GET", "/recipes?isYemeni=true", None, None).await;
    assert_eq!(body[0]["title"], "Zhug");

    let (_, body) = send(&app, "GET", "/recipes?sortBy=title", None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Kubaneh", "Zhug"]);

    let (_, body) = send(&app, "GET", "/recipes/categories", None, None).await;
    assert_eq!(
        body.as_array().unwrap(),
        &vec![serde_json::json!("Bread"), serde_json::json!("Condiments")]
    );
}

#[tokio::test]
async fn test_get_recipe_visibility() {
    let (app, state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, b_token) = signup(&app, "b@example.com", "B").await;
    let root_token = seed_sysadmin(&state).await;

    let public_id = create_recipe(&app, &a_token, "Public Bread", "public", vec![]).await;
    let private_id = create_recipe(&app, &a_token, "Private Notes", "private", vec![]).await;

    // public: everyone, even anonymous
    let (status, _) = send(&app, "GET", &format!("/recipes/{public_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    // private, anonymous: an authentication error, not a 404
    let (status, body) = send(&app, "GET", &format!("/recipes/{private_id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTHENTICATION_REQUIRED");

    // private, wrong user: forbidden
    let (status, _) = send(
        &app,
        "GET",
        &format!("/recipes/{private_id}"),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // creator and sysadmin are allowed
    let (status, _) = send(
        &app,
        "GET",
        &format!("/recipes/{private_id}"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/recipes/{private_id}"),
        Some(&root_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // a missing recipe is a genuine 404
    let (status, _) = send(&app, "GET", "/recipes/9999", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_recipe_visible_to_members_only() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, b_token) = signup(&app, "b@example.com", "B").await;
    let (_, c_token) = signup(&app, "c@example.com", "C").await;

    let (group_id, code) = create_private_group(&app, &a_token, "Family").await;
    send(&app, "POST", &format!("/groups/join/{code}"), Some(&b_token), None).await;

    let recipe_id = create_recipe(&app, &a_token, "Family Special", "group", vec![group_id]).await;
    let uri = format!("/recipes/{recipe_id}");

    // any member role may view
    let (status, _) = send(&app, "GET", &uri, Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // non-members may not
    let (status, _) = send(&app, "GET", &uri, Some(&c_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_recipe_validation() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;

    let (status, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&a_token),
        Some(serde_json::json!({
            "title": " ",
            "category": "",
            "ingredients": [],
            "instructions": [],
            "prepTime": 0,
            "difficulty": 9
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["title", "category", "ingredients", "instructions", "prepTime", "difficulty"] {
        assert!(body["fields"][field].is_string(), "missing field error: {field}");
    }
}

#[tokio::test]
async fn test_group_recipe_requires_contributor_role() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (b_id, b_token) = signup(&app, "b@example.com", "B").await;

    // A creates private group "Family" and invites B by email
    let (group_id, _) = create_private_group(&app, &a_token, "Family").await;
    send(
        &app,
        "POST",
        &format!("/groups/{group_id}/invite"),
        Some(&a_token),
        Some(serde_json::json!({"email": "b@example.com"})),
    )
    .await;

    // B is a plain member: publishing into the group is denied, naming it
    let (status, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&b_token),
        Some(recipe_body("B's Bread", "group", vec![group_id])),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Family"));
    assert!(body["error"].as_str().unwrap().contains("contributor or admin"));

    // A promotes B to contributor, after which creation succeeds
    send(
        &app,
        "PUT",
        &format!("/groups/{group_id}/members/{b_id}"),
        Some(&a_token),
        Some(serde_json::json!({"role": "contributor"})),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/recipes",
        Some(&b_token),
        Some(recipe_body("B's Bread", "group", vec![group_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // the group creator needs no explicit membership row check
    let (status, _) = send(
        &app,
        "POST",
        "/recipes",
        Some(&a_token),
        Some(recipe_body("A's Bread", "group", vec![group_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_group_recipe_needs_groups_and_existing_groups() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;

    let (status, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&a_token),
        Some(recipe_body("Loner", "group", vec![])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["groupIds"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&a_token),
        Some(recipe_body("Ghost Group", "group", vec![404])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "GROUP_NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_update_clears_stale_group_ids() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (group_id, _) = create_private_group(&app, &a_token, "Family").await;

    let recipe_id = create_recipe(&app, &a_token, "Family Special", "group", vec![group_id]).await;

    // flipping to private while the body still carries groupIds: the server
    // clears them anyway
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/recipes/{recipe_id}"),
        Some(&a_token),
        Some(serde_json::json!({
            "visibility": "private",
            "groupIds": [group_id]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visibility"], "private");
    assert!(body["groupIds"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_and_delete_permissions() {
    let (app, state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (b_id, b_token) = signup(&app, "b@example.com", "B").await;
    let (_, c_token) = signup(&app, "c@example.com", "C").await;
    let root_token = seed_sysadmin(&state).await;

    let (group_id, _) = create_private_group(&app, &a_token, "Family").await;
    send(
        &app,
        "POST",
        &format!("/groups/{group_id}/invite"),
        Some(&a_token),
        Some(serde_json::json!({"email": "b@example.com"})),
    )
    .await;
    send(
        &app,
        "PUT",
        &format!("/groups/{group_id}/members/{b_id}"),
        Some(&a_token),
        Some(serde_json::json!({"role": "admin"})),
    )
    .await;

    let recipe_id = create_recipe(&app, &a_token, "Family Special", "group", vec![group_id]).await;
    let uri = format!("/recipes/{recipe_id}");
    let rename = serde_json::json!({"title": "Renamed"});

    // stranger: forbidden
    let (status, _) = send(&app, "PUT", &uri, Some(&c_token), Some(rename.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // group admin of an owning group may edit
    let (status, _) = send(&app, "PUT", &uri, Some(&b_token), Some(rename.clone())).await;
    assert_eq!(status, StatusCode::OK);

    // but may not delete
    let (status, _) = send(&app, "DELETE", &uri, Some(&b_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // sysadmin may edit
    let (status, _) = send(&app, "PUT", &uri, Some(&root_token), Some(rename)).await;
    assert_eq!(status, StatusCode::OK);

    // creator deletes
    let (status, _) = send(&app, "DELETE", &uri, Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, Some(&a_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_replaces_and_requires_view_access() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, b_token) = signup(&app, "b@example.com", "B").await;

    let public_id = create_recipe(&app, &a_token, "Public Bread", "public", vec![]).await;
    let private_id = create_recipe(&app, &a_token, "Private Notes", "private", vec![]).await;
    let rate_uri = format!("/recipes/{public_id}/rate");

    // anonymous rating is rejected
    let (status, _) = send(
        &app,
        "POST",
        &rate_uri,
        None,
        Some(serde_json::json!({"rating": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // out-of-range rating is a field error
    let (status, body) = send(
        &app,
        "POST",
        &rate_uri,
        Some(&a_token),
        Some(serde_json::json!({"rating": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["rating"].is_string());

    // two raters, then A re-rates: one entry per user, later value wins
    let (_, body) = send(
        &app,
        "POST",
        &rate_uri,
        Some(&a_token),
        Some(serde_json::json!({"rating": 5})),
    )
    .await;
    assert_eq!(body["averageRating"].as_f64().unwrap(), 5.0);

    let (_, body) = send(
        &app,
        "POST",
        &rate_uri,
        Some(&b_token),
        Some(serde_json::json!({"rating": 4})),
    )
    .await;
    assert_eq!(body["averageRating"].as_f64().unwrap(), 4.5);

    let (_, body) = send(
        &app,
        "POST",
        &rate_uri,
        Some(&a_token),
        Some(serde_json::json!({"rating": 3})),
    )
    .await;
    assert_eq!(body["averageRating"].as_f64().unwrap(), 3.5);

    // rating needs view access: B cannot rate A's private recipe
    let (status, _) = send(
        &app,
        "POST",
        &format!("/recipes/{private_id}/rate"),
        Some(&b_token),
        Some(serde_json::json!({"rating": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_favorite_toggle_is_idempotent_over_two_applications() {
    let (app, _state) = create_app();
    let (_, a_token) = signup(&app, "a@example.com", "A").await;
    let (_, b_token) = signup(&app, "b@example.com", "B").await;

    let public_id = create_recipe(&app, &a_token, "Public Bread", "public", vec![]).await;
    let private_id = create_recipe(&app, &a_token, "Private Notes", "private", vec![]).await;
    let uri = format!("/recipes/{public_id}/favorite");

    let (status, body) = send(&app, "POST", &uri, Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], true);

    let (_, body) = send(&app, "GET", "/users/favorites", Some(&b_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Public Bread");

    // toggling again returns to the original state
    let (_, body) = send(&app, "POST", &uri, Some(&b_token), None).await;
    assert_eq!(body["isFavorite"], false);
    let (_, body) = send(&app, "GET", "/users/favorites", Some(&b_token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    // favoriting needs view access
    let (status, _) = send(
        &app,
        "POST",
        &format!("/recipes/{private_id}/favorite"),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
