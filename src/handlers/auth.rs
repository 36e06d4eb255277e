//! Authentication HTTP handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::error::{ApiResult, ErrorResponse};
use crate::extract::ApiForm;
use crate::models::{LoginRequest, TokenResponse};

/// POST /api/token - Exchange username and password for an access token
#[utoipa::path(
    post,
    path = "/api/token",
    tag = "auth",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse),
        (status = 422, description = "Malformed form body", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    ApiForm(form): ApiForm<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = service.login(&form.username, &form.password).await?;
    Ok(Json(tokens))
}
