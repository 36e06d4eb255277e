//! Contract routes, each rate limited per client IP

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::config::RateLimitSettings;
use crate::handlers::contract::{create_contract, get_contract, list_deployed_contracts};
use crate::middleware::{rate_limit, RateLimiter};
use crate::state::AppState;

/// Independent limiters for the two throttled contract endpoints
#[derive(Clone)]
pub struct ContractRateLimiters {
    pub create_contract: RateLimiter,
    pub list_contracts: RateLimiter,
}

impl ContractRateLimiters {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            create_contract: RateLimiter::new(settings.create_contract, settings.window)
                .trust_proxy_headers(settings.trust_proxy_headers),
            list_contracts: RateLimiter::new(settings.list_contracts, settings.window)
                .trust_proxy_headers(settings.trust_proxy_headers),
        }
    }

    pub async fn cleanup(&self) {
        self.create_contract.cleanup().await;
        self.list_contracts.cleanup().await;
    }
}

pub fn contract_routes(limiters: ContractRateLimiters) -> Router<AppState> {
    Router::new()
        .route(
            "/api/contracts",
            post(create_contract).layer(from_fn_with_state(limiters.create_contract, rate_limit)),
        )
        .route("/api/contracts/:id", get(get_contract))
        .route(
            "/api/deployed_contracts",
            get(list_deployed_contracts)
                .layer(from_fn_with_state(limiters.list_contracts, rate_limit)),
        )
}
