//! Authentication routes

use axum::{routing::post, Router};

use crate::handlers::auth;
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/token", post(auth::login))
}
