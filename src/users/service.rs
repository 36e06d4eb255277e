//! User registration and account management

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::models::{
    ListUsersParams, NewUser, RegisterRequest, UpdateUserRequest, User, UserChanges,
};
use crate::store::UserStore;

const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Validate, reject username/email collisions, hash and persist
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        request.validate()?;

        if let Some(existing) = self
            .store
            .find_by_username_or_email(&request.username, &request.email)
            .await?
        {
            let reason = if existing.username == request.username {
                "Username already registered"
            } else {
                "Email already registered"
            };
            return Err(ApiError::Conflict(reason.to_string()));
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost)
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let user = self
            .store
            .insert(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                full_name: request.full_name,
                bio: request.bio,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn list_users(&self, params: ListUsersParams) -> Result<Vec<User>, ApiError> {
        params.validate()?;
        let users = self
            .store
            .list(
                params.skip.unwrap_or(0),
                params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            )
            .await?;
        Ok(users)
    }

    /// Apply a partial update; uniqueness is re-checked against other users
    pub async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        request.validate()?;

        let password_hash = match request.password {
            Some(password) => Some(
                hash_password(password, self.bcrypt_cost)
                    .await
                    .map_err(|e| ApiError::InternalError(e.to_string()))?,
            ),
            None => None,
        };

        let changes = UserChanges {
            username: request.username,
            email: request.email,
            password_hash,
            full_name: request.full_name,
            bio: request.bio,
        };

        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let user = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, "User updated");

        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
