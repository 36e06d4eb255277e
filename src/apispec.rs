//! OpenAPI document served at `/api-docs/openapi.json`

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::error::{ErrorDetails, ErrorResponse};
use crate::handlers;
use crate::models::{
    Contract, CreateContractRequest, DeployedContractsResponse, LoginRequest, PageInfo,
    RegisterRequest, TokenResponse, UpdateUserRequest, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StarkFinder API",
        description = "User accounts and deployed contract records"
    ),
    paths(
        handlers::user::register_user,
        handlers::auth::login,
        handlers::user::get_current_user,
        handlers::user::update_current_user,
        handlers::user::delete_current_user,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::contract::create_contract,
        handlers::contract::get_contract,
        handlers::contract::list_deployed_contracts,
    ),
    components(schemas(
        RegisterRequest,
        UpdateUserRequest,
        UserResponse,
        LoginRequest,
        TokenResponse,
        Contract,
        CreateContractRequest,
        DeployedContractsResponse,
        PageInfo,
        ErrorResponse,
        ErrorDetails,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration and account management"),
        (name = "auth", description = "Token issuance"),
        (name = "contracts", description = "Deployed contract records")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
