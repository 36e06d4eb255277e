//! In-process stores
//!
//! Same filtering, ordering and uniqueness rules as the PostgreSQL stores,
//! kept behind a `tokio::sync::RwLock` so they can be shared across handlers.

use std::cmp::Ordering;
use std::sync::Arc;

use axum::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContractStore, StoreError, UserStore};
use crate::contracts::{ContractColumn, ContractFilter, ContractPage, SortOrder};
use crate::models::{Contract, NewContract, NewUser, User, UserChanges};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_clash(users: &[User], skip_id: Option<Uuid>, username: &str, email: &str) -> Option<String> {
    users
        .iter()
        .filter(|u| Some(u.id) != skip_id)
        .find_map(|u| {
            if u.username == username {
                Some("Username already registered".to_string())
            } else if u.email == email {
                Some("Email already registered".to_string())
            } else {
                None
            }
        })
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if let Some(reason) = user_clash(&users, None, &user.username, &user.email) {
            return Err(StoreError::Conflict(reason));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            bio: user.bio,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };

        let username = changes
            .username
            .unwrap_or_else(|| users[index].username.clone());
        let email = changes.email.unwrap_or_else(|| users[index].email.clone());
        if let Some(reason) = user_clash(&users, Some(id), &username, &email) {
            return Err(StoreError::Conflict(reason));
        }

        let user = &mut users[index];
        user.username = username;
        user.email = email;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(full_name) = changes.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[derive(Clone, Default)]
pub struct MemoryContractStore {
    contracts: Arc<RwLock<Vec<Contract>>>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_filter(contract: &Contract, filter: &ContractFilter) -> bool {
    filter
        .name
        .as_deref()
        .map_or(true, |n| contains_ignore_case(&contract.name, n))
        && filter
            .address
            .as_deref()
            .map_or(true, |a| contains_ignore_case(&contract.address, a))
}

/// Byte-wise on text columns, matching `COLLATE "C"` in the Postgres store
fn compare(a: &Contract, b: &Contract, column: ContractColumn) -> Ordering {
    match column {
        ContractColumn::Id => a.id.cmp(&b.id),
        ContractColumn::Name => a.name.cmp(&b.name),
        ContractColumn::Address => a.address.cmp(&b.address),
        ContractColumn::DeploymentDate => a.deployment_date.cmp(&b.deployment_date),
    }
}

#[async_trait]
impl ContractStore for MemoryContractStore {
    async fn insert(&self, contract: NewContract) -> Result<Contract, StoreError> {
        let mut contracts = self.contracts.write().await;

        if contracts.iter().any(|c| c.address == contract.address) {
            return Err(StoreError::Conflict(format!(
                "Contract with address {} already exists",
                contract.address
            )));
        }

        let contract = Contract {
            id: Uuid::new_v4(),
            name: contract.name,
            address: contract.address,
            deployment_date: contract.deployment_date,
        };
        contracts.push(contract.clone());
        Ok(contract)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contract>, StoreError> {
        Ok(self
            .contracts
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list(&self, filter: &ContractFilter) -> Result<ContractPage<Contract>, StoreError> {
        let mut matching: Vec<Contract> = self
            .contracts
            .read()
            .await
            .iter()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();

        let total = matching.len() as i64;

        matching.sort_by(|a, b| {
            let primary = compare(a, b, filter.sort.column);
            let primary = match filter.sort.order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let items = matching
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok(ContractPage { items, total })
    }
}
