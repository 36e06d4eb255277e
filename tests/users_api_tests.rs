//! Registration, login and account endpoints driven through the full router

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};

use common::{get, json_request, send, test_app, with_bearer};

fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "correct horse",
        "full_name": "Test User"
    })
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/reg",
            &registration(username, &format!("{username}@example.com")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, token) = send(app, login_request(username, "correct%20horse")).await;
    assert_eq!(status, StatusCode::OK);
    token["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_returns_created_user_without_hash() {
    let app = test_app();
    let (status, user) = send(
        &app,
        json_request("POST", "/api/reg", &registration("alice", "alice@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["is_active"], true);
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_username_or_email_is_rejected() {
    let app = test_app();
    send(
        &app,
        json_request("POST", "/api/reg", &registration("alice", "alice@example.com")),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/reg", &registration("alice", "other@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Username already registered");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/reg", &registration("alicia", "alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email already registered");
}

#[tokio::test]
async fn test_malformed_email_is_unprocessable() {
    let app = test_app();
    for email in ["alice.example.com", "alice@localhost"] {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/reg", &registration("alice", email)),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "email {email}");
        assert!(body["error"]["details"].as_str().unwrap().contains("email"));
    }
}

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = test_app();
    let token = register_and_login(&app, "bob").await;
    assert!(!token.is_empty());

    let (status, body) = send(&app, login_request("bob", "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, login_request("nobody", "whatever")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_requires_valid_token() {
    let app = test_app();

    let (status, _) = send(&app, get("/api/user")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, with_bearer(get("/api/user"), "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register_and_login(&app, "carol").await;
    let (status, me) = send(&app, with_bearer(get("/api/user"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "carol");
}

#[tokio::test]
async fn test_update_and_delete_current_user() {
    let app = test_app();
    let token = register_and_login(&app, "dave").await;

    let (status, updated) = send(
        &app,
        with_bearer(
            json_request("PATCH", "/api/user", &json!({"bio": "builder"})),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "builder");
    assert_eq!(updated["email"], "dave@example.com");

    let (status, _) = send(
        &app,
        with_bearer(
            Request::builder()
                .method("DELETE")
                .uri("/api/user")
                .body(Body::empty())
                .unwrap(),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // the token's subject no longer resolves
    let (status, _) = send(&app, with_bearer(get("/api/user"), &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_and_lookup_users() {
    let app = test_app();
    let token = register_and_login(&app, "erin").await;
    register_and_login(&app, "frank").await;

    let (status, users) = send(&app, with_bearer(get("/api/users?limit=1"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);

    let (status, users) = send(&app, with_bearer(get("/api/users"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);

    let id = users[1]["id"].as_str().unwrap();
    let (status, found) = send(&app, with_bearer(get(&format!("/api/user/{id}")), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["username"], users[1]["username"]);

    let (status, _) = send(
        &app,
        with_bearer(
            get("/api/user/00000000-0000-0000-0000-000000000000"),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let app = test_app();
    let response = {
        use tower::ServiceExt;
        app.clone().oneshot(get("/")).await.unwrap()
    };
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_malformed_json_body_is_unprocessable() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/reg")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_body_without_json_content_type_is_unprocessable() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/reg")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(registration("alice", "alice@example.com").to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
