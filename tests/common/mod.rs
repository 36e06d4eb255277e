//! Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use starkfinder_backend::{
    app::build_router,
    auth::JwtIssuer,
    config::RateLimitSettings,
    routes::ContractRateLimiters,
    state::AppState,
    store::{MemoryContractStore, MemoryUserStore},
};

pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_app() -> Router {
    test_app_with_limits(RateLimitSettings::default())
}

pub fn test_app_with_limits(settings: RateLimitSettings) -> Router {
    let state = AppState::from_backends(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryContractStore::new()),
        Arc::new(JwtIssuer::new("integration-test-secret", 1800)),
        TEST_BCRYPT_COST,
    );
    build_router(state, ContractRateLimiters::new(&settings))
}

pub fn limits(create_contract: u32, list_contracts: u32) -> RateLimitSettings {
    RateLimitSettings {
        create_contract,
        list_contracts,
        window: Duration::from_secs(60),
        trust_proxy_headers: false,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

pub fn address(fill: char) -> String {
    format!("0x{}", fill.to_string().repeat(40))
}
