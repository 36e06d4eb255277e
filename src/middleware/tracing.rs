//! Request tracing middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::rate_limiter::peer_ip;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Logs each request with timing inside a span carrying a request id, and
/// echoes the id back in `x-request-id`.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = peer_ip(&request);

    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("http_request", request_id = %request_id);
    let start = Instant::now();

    let mut response = async {
        tracing::debug!(method = %method, path = %path, client_ip = %client_ip, "Request started");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    span.in_scope(|| {
        if response.status().is_server_error() {
            tracing::error!(%method, %path, status, duration_ms, "Request completed with error");
        } else if response.status().is_client_error() {
            tracing::warn!(%method, %path, status, duration_ms, "Request completed with client error");
        } else {
            tracing::info!(%method, %path, status, duration_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    response
}
