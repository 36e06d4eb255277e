//! API handlers for StarkFinder backend

pub mod auth;
pub mod contract;
pub mod user;

pub use auth::login;
pub use contract::{create_contract, get_contract, list_deployed_contracts};
pub use user::{
    delete_current_user, get_current_user, get_user, list_users, register_user,
    update_current_user,
};

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
