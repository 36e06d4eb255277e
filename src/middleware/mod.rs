//! Middleware for StarkFinder API
//!
//! Request tracing, per-route rate limiting, security headers and the
//! bearer-token extractor.

pub mod auth;
mod rate_limiter;
mod security;
mod tracing;

pub use auth::AuthenticatedUser;
pub use rate_limiter::{client_ip, peer_ip, rate_limit, RateDecision, RateLimiter};
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;
