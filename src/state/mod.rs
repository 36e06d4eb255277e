//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AuthService, TokenIssuer};
use crate::contracts::ContractService;
use crate::store::{ContractStore, UserStore};
use crate::users::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub contract_service: Arc<ContractService>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        auth_service: Arc<AuthService>,
        contract_service: Arc<ContractService>,
    ) -> Self {
        Self {
            user_service,
            auth_service,
            contract_service,
        }
    }

    /// Wire the services over the given storage and token backends
    pub fn from_backends(
        users: Arc<dyn UserStore>,
        contracts: Arc<dyn ContractStore>,
        tokens: Arc<dyn TokenIssuer>,
        bcrypt_cost: u32,
    ) -> Self {
        Self::new(
            Arc::new(UserService::new(users.clone(), bcrypt_cost)),
            Arc::new(AuthService::new(users, tokens)),
            Arc::new(ContractService::new(contracts)),
        )
    }
}

impl FromRef<AppState> for Arc<UserService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<ContractService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.contract_service.clone()
    }
}
