//! Fixed-window rate limiting middleware
//!
//! Each limited route owns its own [`RateLimiter`]; counters are keyed by
//! the socket peer address and reset when the window elapses. Proxy headers
//! are only consulted when the limiter is told to trust them.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window counter per client key
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
            trust_proxy_headers: false,
        }
    }

    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Count a request from `key`; the first request over the limit is refused.
    pub async fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(now.duration_since(window.started)),
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }

    /// Drop windows that have already expired
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.windows
            .lock()
            .await
            .retain(|_, w| now.duration_since(w.started) < window);
    }
}

/// `axum::middleware::from_fn_with_state` entry point
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client_key = client_ip(&request, limiter.trust_proxy_headers);

    match limiter.check(&client_key).await {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!(client = %client_key, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::TooManyRequests {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into_response()
        }
    }
}

/// Socket peer address, else `unknown`
pub fn peer_ip(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate-limit key for a request
///
/// With `trust_proxy_headers` the first `X-Forwarded-For` hop, then
/// `X-Real-IP`, win over the peer address. Without it those headers are
/// ignored, since any client can set them.
pub fn client_ip(request: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        let headers = request.headers();

        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return ip.to_string();
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return ip.to_string();
        }
    }

    peer_ip(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test(start_paused = true)]
    async fn test_request_crossing_threshold_is_limited() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        for expected in [2, 1, 0] {
            assert_eq!(
                limiter.check("client").await,
                RateDecision::Allowed {
                    remaining: expected
                }
            );
        }
        assert!(matches!(
            limiter.check("client").await,
            RateDecision::Limited { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(matches!(limiter.check("c").await, RateDecision::Allowed { .. }));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(
            limiter.check("c").await,
            RateDecision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(matches!(limiter.check("c").await, RateDecision::Allowed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(matches!(limiter.check("a").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("b").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("a").await, RateDecision::Limited { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        limiter.check("a").await;
        tokio::time::advance(Duration::from_secs(11)).await;
        limiter.cleanup().await;
        assert!(limiter.windows.lock().await.is_empty());
    }

    #[test]
    fn test_client_ip_sources() {
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000)));

        let request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .extension(peer)
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, true), "203.0.113.7");
        assert_eq!(client_ip(&request, false), "192.0.2.1");

        let request = axum::http::Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .extension(peer)
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, true), "198.51.100.2");
        assert_eq!(client_ip(&request, false), "192.0.2.1");

        let mut request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request, true), "unknown");

        request.extensions_mut().insert(peer);
        assert_eq!(client_ip(&request, true), "192.0.2.1");
        assert_eq!(peer_ip(&request), "192.0.2.1");
    }
}
