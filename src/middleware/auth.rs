//! Authentication extractor
//!
//! Resolves `Authorization: Bearer <token>` to the stored user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::User;

/// Authenticated user extracted from the bearer token
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(AuthenticatedUser(user): AuthenticatedUser) -> String {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let auth_service = Arc::<AuthService>::from_ref(state);
        let user = auth_service.authenticate(bearer.token()).await?;

        Ok(AuthenticatedUser(user))
    }
}
