//! Integration tests for the contact API
//!
//! Drives the full axum router (auth middleware included) against a
//! temporary SQLite database, covering the register/login/contact flow
//! and the 403-vs-401 authorization taxonomy.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use contactmyst_backend::{
    auth::{JwtHandler, UserStore},
    contacts::ContactStore,
    server::{self, AppState},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret-key";

fn test_app() -> (Router, AppState, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap();

    let state = AppState {
        user_store: Arc::new(UserStore::new(db_path).unwrap()),
        contact_store: Arc::new(ContactStore::new(db_path).unwrap()),
        jwt_handler: Arc::new(JwtHandler::new(TEST_SECRET.to_string())),
    };

    (server::create_router(state.clone()), state, temp_file)
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
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/contactmyst/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/contactmyst/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Register + login, returning the bearer token.
async fn login_as(app: &Router, name: &str, email: &str) -> String {
    let (status, _) = register(app, name, email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = login(app, email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_end_to_end_contact_flow() {
    let (app, _state, _temp) = test_app();

    // Register
    let (status, body) = register(&app, "Alice", "alice@example.com", "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "User");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
    // No token at registration
    assert!(body.get("token").is_none());

    // Login
    let (status, body) = login(&app, "alice@example.com", "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "alice@example.com");
    let token = body["token"].as_str().unwrap().to_string();

    // Add a contact
    let (status, body) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&token),
        Some(json!({
            "name": "John Smith",
            "email": "john@example.com",
            "phone": "555-0100",
            "address": "1 Main St"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let contact_id = body["id"].as_str().unwrap().to_string();

    // List contains it
    let (status, body) = send(
        &app,
        Method::GET,
        "/contactmyst/contacts",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["contacts"][0]["id"].as_str().unwrap(), contact_id);

    // Delete it; response carries the remaining (now empty) list
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/contactmyst/contacts/{contact_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contacts"], json!([]));

    // And the list agrees
    let (status, body) = send(
        &app,
        Method::GET,
        "/contactmyst/contacts",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contacts"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _state, _temp) = test_app();

    let (status, _) = register(&app, "Alice", "alice@example.com", "password123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "Imposter", "alice@example.com", "different1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["detail"][0]["msg"], "User Already Existed");
}

#[tokio::test]
async fn test_register_validation_errors_are_a_list() {
    let (app, _state, _temp) = test_app();

    let (status, body) = register(&app, "", "not-an-email", "abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["detail"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_login_failures() {
    let (app, _state, _temp) = test_app();

    register(&app, "Alice", "alice@example.com", "password123").await;

    // Unknown email
    let (status, body) = login(&app, "nobody@example.com", "password123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["msg"], "User Not Registered");
    assert!(body.get("token").is_none());

    // Wrong password
    let (status, body) = login(&app, "alice@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["msg"], "Wrong Password");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_missing_header_403_vs_bad_token_401() {
    let (app, state, _temp) = test_app();

    // No Authorization header at all
    let (status, body) = send(&app, Method::GET, "/contactmyst/auth", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
    assert_eq!(body["detail"], "Forbidden");

    // Garbage token
    let (status, body) = send(
        &app,
        Method::GET,
        "/contactmyst/auth",
        Some("garbage.token.here"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Unauthorized");

    // Structurally valid token for a user that no longer exists
    let token = login_as(&app, "Ghost", "ghost@example.com").await;
    let user = state
        .user_store
        .find_by_email("ghost@example.com")
        .unwrap()
        .unwrap();
    state.user_store.delete_user(&user.id).unwrap();

    let (status, body) = send(&app, Method::GET, "/contactmyst/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn test_auth_returns_whitelist_projection() {
    let (app, _state, _temp) = test_app();

    let token = login_as(&app, "Alice", "alice@example.com").await;

    let (status, body) = send(&app, Method::GET, "/contactmyst/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let user = &body["user"];
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "User");
    assert!(user.get("created_at").is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_update_profile_and_email_conflict() {
    let (app, _state, _temp) = test_app();

    let alice = login_as(&app, "Alice", "alice@example.com").await;
    login_as(&app, "Bob", "bob@example.com").await;

    // Plain update
    let (status, body) = send(
        &app,
        Method::PUT,
        "/contactmyst/update-profile",
        Some(&alice),
        Some(json!({ "name": "Alice L.", "about": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice L.");
    assert_eq!(body["user"]["about"], "hello");
    assert_eq!(body["user"]["email"], "alice@example.com");

    // Stealing Bob's email is a conflict
    let (status, body) = send(
        &app,
        Method::PUT,
        "/contactmyst/update-profile",
        Some(&alice),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");
    assert_eq!(body["detail"], "Email already in use");
}

#[tokio::test]
async fn test_duplicate_contact_conflicts_are_field_specific() {
    let (app, _state, _temp) = test_app();

    let alice = login_as(&app, "Alice", "alice@example.com").await;
    let bob = login_as(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&alice),
        Some(json!({ "name": "John", "email": "john@example.com", "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Uniqueness is global: Bob hits the conflict too
    let (status, body) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&bob),
        Some(json!({ "name": "Johnny", "email": "john@example.com", "phone": "555-0199" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");
    assert_eq!(body["detail"], "Contact with this email already exists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&bob),
        Some(json!({ "name": "Johnny", "email": "johnny@example.com", "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Contact with this phone number already exists");
}

#[tokio::test]
async fn test_search_and_pagination() {
    let (app, _state, _temp) = test_app();

    let token = login_as(&app, "Alice", "alice@example.com").await;

    for (name, email, phone) in [
        ("Anna Smith", "anna@example.com", "555-0001"),
        ("Bob Smith", "bob.smith@example.com", "555-0002"),
        ("Carol Jones", "carol@example.com", "555-0003"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/contactmyst/add-contacts",
            Some(&token),
            Some(json!({ "name": name, "email": email, "phone": phone })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Case-insensitive substring across name/email/phone
    let (status, body) = send(
        &app,
        Method::GET,
        "/contactmyst/contacts?search=smith",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["pages"], 1);

    // pages == ceil(total / limit)
    let (status, body) = send(
        &app,
        Method::GET,
        "/contactmyst/contacts?page=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["contacts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_contacts_are_invisible_to_other_users() {
    let (app, _state, _temp) = test_app();

    let alice = login_as(&app, "Alice", "alice@example.com").await;
    let bob = login_as(&app, "Bob", "bob@example.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&alice),
        Some(json!({ "name": "John", "email": "john@example.com", "phone": "555-0100" })),
    )
    .await;
    let contact_id = body["id"].as_str().unwrap().to_string();

    // Bob cannot read, mutate, or delete Alice's contact by id
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/contactmyst/contacts/{contact_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/contactmyst/update-contacts/{contact_id}"),
        Some(&bob),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/contactmyst/contacts/{contact_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No Record Existed");

    // Alice still sees it, untouched
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/contactmyst/contacts/{contact_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "John");
}

#[tokio::test]
async fn test_update_contact_partial_fields() {
    let (app, _state, _temp) = test_app();

    let token = login_as(&app, "Alice", "alice@example.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/contactmyst/add-contacts",
        Some(&token),
        Some(json!({ "name": "John", "email": "john@example.com", "phone": "555-0100" })),
    )
    .await;
    let contact_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/contactmyst/update-contacts/{contact_id}"),
        Some(&token),
        Some(json!({ "name": "Johnny", "address": "2 Side St" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Johnny");
    assert_eq!(body["address"], "2 Side St");
    // Untouched fields survive
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["phone"], "555-0100");
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _state, _temp) = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_get_missing_contact_is_404() {
    let (app, _state, _temp) = test_app();

    let token = login_as(&app, "Alice", "alice@example.com").await;
    let random_id = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/contactmyst/contacts/{random_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["detail"], "Contact not found");
}
