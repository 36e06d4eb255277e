//! Data models for StarkFinder backend

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub mod auth;
pub mod contract;

pub use auth::*;
pub use contract::*;

/// Registered user row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response (sanitized for API)
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            bio: user.bio,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload for `POST /api/reg`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(custom = "validate_email_shape")]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[validate(length(max = 128))]
    pub full_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

/// Partial update for the authenticated user
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    #[validate(custom = "validate_email_shape")]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
    #[validate(length(max = 128))]
    pub full_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

/// Insert payload handed to a [`crate::store::UserStore`]
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

/// Field patch handed to a [`crate::store::UserStore`]; `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.full_name.is_none()
            && self.bio.is_none()
    }
}

/// An email must contain `@` and a `.` somewhere after the last `@`.
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    match email.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') => Ok(()),
        _ => {
            let mut err = ValidationError::new("email");
            err.message = Some(Cow::from("Invalid email address"));
            Err(err)
        }
    }
}
