// End-to-end tests for the User API
// Requests go through the full router: authentication, authorization and handlers

use super::*;
use crate::auth::{clock::ManualClock, password::test_password_service, StaticRoles};
use crate::users::InMemoryUserStore;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::json;

const SECRET: &str = "end-to-end-test-secret";

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_app_with_tokens(tokens: Arc<TokenService>) -> TestServer {
    let policy = AccessPolicy::new(AccessPolicy::default_rules()).unwrap();
    let state = AppState::new(
        Arc::new(InMemoryUserStore::new()),
        tokens,
        test_password_service(),
        Arc::new(StaticRoles::default()),
        policy,
    );

    TestServer::new(create_router(state)).unwrap()
}

fn create_test_app() -> TestServer {
    create_test_app_with_tokens(Arc::new(TokenService::new(SECRET, 3600)))
}

fn user_payload(username: &str, phone_no: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "name": "Test User",
        "address": "1 Test Street",
        "phone_no": phone_no,
        "email": email,
        "password": "pa55word"
    })
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn register(server: &TestServer, username: &str, phone_no: &str) -> TestResponse {
    server
        .post("/user/save")
        .json(&user_payload(username, phone_no, &format!("{}@example.com", username)))
        .await
}

async fn login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/user/login")
        .json(&json!({ "username": username, "password": "pa55word" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Welcome, login successful!");
    body["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Registration and login
// ============================================================================

#[tokio::test]
async fn test_register_login_and_fetch_profile() {
    let server = create_test_app();

    let response = register(&server, "alice", "5550001111").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["username"], "alice");
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let token = login(&server, "alice").await;

    let response = server
        .get("/user/get/alice")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let server = create_test_app();

    let response = server
        .post("/user/save")
        .json(&user_payload("Alice!", "5550001111", "alice@example.com"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/user/save")
        .json(&user_payload("alice", "555-0001", "alice@example.com"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;

    let same_username = register(&server, "alice", "5550002222").await;
    assert_eq!(same_username.status_code(), StatusCode::CONFLICT);

    let same_phone = register(&server, "bob", "5550001111").await;
    assert_eq!(same_phone.status_code(), StatusCode::CONFLICT);
    let body: serde_json::Value = same_phone.json();
    assert_eq!(body["message"], "User already exists with phone_no: 5550001111");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;

    let wrong_password = server
        .post("/user/login")
        .json(&json!({ "username": "alice", "password": "nope" }))
        .await;
    let unknown_user = server
        .post("/user/login")
        .json(&json!({ "username": "mallory", "password": "pa55word" }))
        .await;

    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status_code(), StatusCode::UNAUTHORIZED);
    let wrong_password: serde_json::Value = wrong_password.json();
    let unknown_user: serde_json::Value = unknown_user.json();
    assert_eq!(wrong_password["error_code"], unknown_user["error_code"]);
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}

// ============================================================================
// Authentication pipeline and authorization gate
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token_is_rejected() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;

    let response = server.get("/user/get/alice").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error_code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn test_malformed_authorization_headers_are_rejected_on_protected_routes() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    let token = login(&server, "alice").await;

    for value in [
        "Bearer not.a.token".to_string(),
        format!("bearer {}", token),
        format!("Token {}", token),
        "Bearer ".to_string(),
    ] {
        let response = server
            .get("/user/get/alice")
            .add_header(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap())
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{}", value);
    }
}

#[tokio::test]
async fn test_garbage_token_does_not_block_public_routes() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;

    let response = server
        .post("/user/login")
        .add_header(header::AUTHORIZATION, bearer("garbage"))
        .json(&json!({ "username": "alice", "password": "pa55word" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/user/save")
        .add_header(header::AUTHORIZATION, bearer("garbage"))
        .json(&user_payload("bob", "5550002222", "bob@example.com"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_token_of_deleted_user_stops_working() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    register(&server, "bob", "5550002222").await;
    let alice = login(&server, "alice").await;
    let bob = login(&server, "bob").await;

    let response = server
        .delete("/user/delete/alice")
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "User deleted by username: alice");

    let response = server
        .get("/user/get/bob")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let tokens = Arc::new(TokenService::with_clock(SECRET, 60, clock.clone()));
    let server = create_test_app_with_tokens(tokens);
    register(&server, "alice", "5550001111").await;
    let token = login(&server, "alice").await;

    clock.advance(59);
    let response = server
        .get("/user/get/alice")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    clock.advance(1);
    let response = server
        .get("/user/get/alice")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_revokes_only_that_token() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    let first = login(&server, "alice").await;

    let response = server
        .post("/user/logout")
        .add_header(header::AUTHORIZATION, bearer(&first))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "alice, you have been logged out.");

    let response = server
        .get("/user/get/alice")
        .add_header(header::AUTHORIZATION, bearer(&first))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/user/logout")
        .add_header(header::AUTHORIZATION, bearer(&first))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let server = create_test_app();

    let response = server.post("/user/logout").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Update and delete
// ============================================================================

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    let token = login(&server, "alice").await;

    let response = server
        .patch("/user/update/alice")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "address": "2 New Road", "password": "n3w-pass" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["address"], "2 New Road");
    assert_eq!(body["phone_no"], "5550001111");

    // the new password is hashed and usable
    let response = server
        .post("/user/login")
        .json(&json!({ "username": "alice", "password": "n3w-pass" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_into_taken_email_conflicts() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    register(&server, "bob", "5550002222").await;
    let token = login(&server, "alice").await;

    let response = server
        .patch("/user/update/alice")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "email": "bob@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let server = create_test_app();
    register(&server, "alice", "5550001111").await;
    let token = login(&server, "alice").await;

    let response = server
        .get("/user/get/ghost")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .delete("/user/delete/ghost")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Public infrastructure routes
// ============================================================================

#[tokio::test]
async fn test_health_and_api_docs_are_public() {
    let server = create_test_app();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>(), json!({ "status": "ok" }));

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/user/login"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_unlisted_route_requires_authentication() {
    let server = create_test_app();

    let response = server.get("/admin/stats").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
