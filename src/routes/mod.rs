//! Route definitions for StarkFinder API

mod auth;
mod contract;
mod user;

pub use auth::auth_routes;
pub use contract::{contract_routes, ContractRateLimiters};
pub use user::user_routes;
