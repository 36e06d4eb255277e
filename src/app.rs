//! Router assembly shared by the server binary and the integration tests

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::apispec::ApiDoc;
use crate::middleware;
use crate::routes::{self, ContractRateLimiters};
use crate::state::AppState;

/// All API routes with security headers and request tracing applied
pub fn build_router(state: AppState, limiters: ContractRateLimiters) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_document))
        .merge(routes::user_routes())
        .merge(routes::auth_routes())
        .merge(routes::contract_routes(limiters))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "StarkFinder API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Permissive when no origins are configured
pub fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default().trim();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}
