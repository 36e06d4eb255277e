//! Authentication models for StarkFinder

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for `POST /api/token` (OAuth2 password grant fields)
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access token response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}
