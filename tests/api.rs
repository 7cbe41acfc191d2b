use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use todo_auth_api::{db, route::create_router, token::Keys, AppState};

// Build the real router over a fresh in-memory database. One connection so
// every request sees the same database.
async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::create_tables(&pool).await.unwrap();

    let state = Arc::new(AppState {
        db: pool,
        keys: Keys::new(b"test-secret"),
    });
    create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn signup(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn add_todo(app: &Router, token: &str, body: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/todos/", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body
}

#[tokio::test]
async fn signup_returns_a_usable_token() {
    let app = test_app().await;
    let token = signup(&app, "alice", "correct horse").await;

    let (status, body) = send(&app, Method::GET, "/auth/whoami", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["id"].is_i64());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = test_app().await;
    signup(&app, "alice", "pw-one").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "pw-two" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn signup_rejects_empty_and_oversized_input() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "x".repeat(73) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_verifies_credentials() {
    let app = test_app().await;
    signup(&app, "alice", "correct-horse").await;

    let (status, body) = login(&app, "alice", "wrong-horse").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect username or password");

    // unknown username gets the identical answer
    let (status, body) = login(&app, "nobody", "correct-horse").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect username or password");

    let (status, body) = login(&app, "alice", "correct-horse").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, "/auth/whoami", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::GET, "/todos/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/todos/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // wrong scheme counts as missing
    let request = Request::builder()
        .method(Method::GET)
        .uri("/todos/")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Bearer",
    );
}

#[tokio::test]
async fn todos_are_invisible_across_accounts() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;
    let bob = signup(&app, "bob", "pw").await;

    let todo = add_todo(&app, &alice, json!({ "title": "buy milk" })).await;
    assert_eq!(todo["completed"], false);
    let id = todo["id"].as_i64().unwrap();

    // bob can neither read, update, nor delete alice's todo
    let uri = format!("/todos/{}", id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // untouched for the owner
    let (status, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "buy milk");
    assert_eq!(body["completed"], false);
}

#[tokio::test]
async fn list_is_scoped_to_the_caller_in_creation_order() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;
    let bob = signup(&app, "bob", "pw").await;

    for title in ["first", "second", "third"] {
        add_todo(&app, &alice, json!({ "title": title })).await;
    }
    add_todo(&app, &bob, json!({ "title": "bob's own" })).await;

    let (status, body) = send(&app, Method::GET, "/todos/", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["first", "second", "third"]);

    let (status, body) = send(&app, Method::GET, "/todos/", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let carol = signup(&app, "carol", "pw").await;
    let (status, body) = send(&app, Method::GET, "/todos/", Some(&carol), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn update_touches_only_the_supplied_fields() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;

    let todo = add_todo(
        &app,
        &alice,
        json!({ "title": "buy milk", "description": "two liters" }),
    )
    .await;
    let uri = format!("/todos/{}", todo["id"].as_i64().unwrap());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "buy milk");
    assert_eq!(body["description"], "two liters");
    assert_eq!(body["completed"], true);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "title": "buy oat milk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "buy oat milk");
    assert_eq!(body["description"], "two liters");
    assert_eq!(body["completed"], true);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_is_permanent() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;

    let todo = add_todo(&app, &alice, json!({ "title": "ephemeral" })).await;
    let uri = format!("/todos/{}", todo["id"].as_i64().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("deleted"));

    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_ignores_a_spoofed_owner() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;

    let (_, me) = send(&app, Method::GET, "/auth/whoami", Some(&alice), None).await;
    let alice_id = me["id"].as_i64().unwrap();

    let todo = add_todo(
        &app,
        &alice,
        json!({ "title": "mine", "owner_id": alice_id + 1000 }),
    )
    .await;
    assert_eq!(todo["owner_id"], alice_id);
}

#[tokio::test]
async fn create_requires_a_title() {
    let app = test_app().await;
    let alice = signup(&app, "alice", "pw").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/todos/",
        Some(&alice),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
