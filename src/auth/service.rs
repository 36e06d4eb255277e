//! Authentication service
//!
//! Password login and bearer-token resolution on top of a [`UserStore`] and a
//! [`TokenIssuer`].

use std::sync::Arc;

use thiserror::Error;

use crate::error::ApiError;
use crate::models::{TokenResponse, User};
use crate::store::{StoreError, UserStore};

use super::jwt::{JwtError, TokenIssuer};
use super::password::{verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token subject does not resolve to an active user")]
    UnknownSubject,

    #[error("Token error: {0}")]
    Issuing(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::UnknownSubject => {
                ApiError::Unauthorized("Could not validate credentials".to_string())
            }
            AuthError::Issuing(e) => ApiError::InternalError(e),
            AuthError::Password(e) => ApiError::InternalError(e.to_string()),
            AuthError::Store(e) => e.into(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { users, tokens }
    }

    /// Check a username/password pair and issue an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(username, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self
            .tokens
            .issue(&user.username)
            .map_err(|e| AuthError::Issuing(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(TokenResponse {
            access_token: issued.token,
            token_type: "bearer".to_string(),
            expires_in: issued.expires_in,
        })
    }

    /// Resolve a bearer token to the stored user it names
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token).map_err(|e| match e {
            JwtError::TokenExpired => AuthError::TokenExpired,
            other => AuthError::InvalidToken(other.to_string()),
        })?;

        match self.users.find_by_username(&claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::UnknownSubject),
        }
    }
}
