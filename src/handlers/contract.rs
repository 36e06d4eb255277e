use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::contracts::ContractService;
use crate::error::{ApiResult, ErrorResponse};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    Contract, CreateContractRequest, DeployedContractsResponse, ListContractsParams,
};

#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract recorded; address stored lowercase", body = Contract),
        (status = 400, description = "Address already recorded", body = ErrorResponse),
        (status = 422, description = "Invalid name or address", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn create_contract(
    State(service): State<Arc<ContractService>>,
    ApiJson(request): ApiJson<CreateContractRequest>,
) -> ApiResult<(StatusCode, Json<Contract>)> {
    let contract = service.create_contract(request).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "contracts",
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract", body = Contract),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn get_contract(
    State(service): State<Arc<ContractService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Contract>> {
    let contract = service.get_contract(id).await?;
    Ok(Json(contract))
}

#[utoipa::path(
    get,
    path = "/api/deployed_contracts",
    tag = "contracts",
    params(ListContractsParams),
    responses(
        (status = 200, description = "Matching contracts", body = DeployedContractsResponse),
        (status = 400, description = "Invalid sort specification", body = ErrorResponse),
        (status = 422, description = "Invalid pagination", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn list_deployed_contracts(
    State(service): State<Arc<ContractService>>,
    ApiQuery(params): ApiQuery<ListContractsParams>,
) -> ApiResult<Json<DeployedContractsResponse>> {
    let result = service.list_contracts(params).await?;
    Ok(Json(result))
}
