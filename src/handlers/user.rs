//! User-related API handlers

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::AuthenticatedUser;
use crate::error::{ApiResult, ErrorResponse};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{ListUsersParams, RegisterRequest, UpdateUserRequest, UserResponse};
use crate::users::UserService;

/// POST /api/reg - Register a new user
#[utoipa::path(
    post,
    path = "/api/reg",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Username or email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid registration data", body = ErrorResponse)
    )
)]
pub async fn register_user(
    State(service): State<Arc<UserService>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/user - The user the bearer token belongs to
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_current_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PATCH /api/user - Update fields of the current user
#[utoipa::path(
    patch,
    path = "/api/user",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Username or email already registered", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Invalid update", body = ErrorResponse)
    )
)]
pub async fn update_current_user(
    State(service): State<Arc<UserService>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = service.update_user(user.id, request).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/user - Remove the current user
#[utoipa::path(
    delete,
    path = "/api/user",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn delete_current_user(
    State(service): State<Arc<UserService>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<StatusCode> {
    service.delete_user(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users - Page through registered users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(service): State<Arc<UserService>>,
    _caller: AuthenticatedUser,
    ApiQuery(params): ApiQuery<ListUsersParams>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = service.list_users(params).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/user/:id - Look up a user by id
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(service): State<Arc<UserService>>,
    _caller: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = service.get_user(id).await?;
    Ok(Json(user.into()))
}
