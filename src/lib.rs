//! StarkFinder Backend Library
//!
//! User accounts, deployed contract records and the DeFi yield tooling used
//! by the `fetch_yields` and `yield_advisor` binaries.

pub mod apispec;
pub mod app;
pub mod auth;
pub mod config;
pub mod contracts;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod users;
pub mod yields;
