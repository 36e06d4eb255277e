//! Persistence capabilities for users and contracts
//!
//! Services depend on the [`UserStore`] and [`ContractStore`] traits only.
//! [`postgres`] backs them with sqlx in production; [`memory`] keeps rows in
//! process for tests and local runs.

use axum::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::{ContractFilter, ContractPage};
use crate::models::{Contract, NewContract, NewUser, User, UserChanges};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryContractStore, MemoryUserStore};
pub use postgres::{PgContractStore, PgUserStore};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries a human-readable reason.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Any user whose username or email equals the given ones.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError>;

    /// Returns `None` when no user has this id.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn insert(&self, contract: NewContract) -> Result<Contract, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contract>, StoreError>;

    async fn list(&self, filter: &ContractFilter) -> Result<ContractPage<Contract>, StoreError>;
}
