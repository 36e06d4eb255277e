//! Deployed contract models

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Deployed contract row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Contract {
    pub id: Uuid,
    pub name: String,
    /// Lowercase `0x`-prefixed 20-byte hex address
    pub address: String,
    pub deployment_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom = "validate_contract_address")]
    pub address: String,
    /// Defaults to the time of the request
    pub deployment_date: Option<DateTime<Utc>>,
}

/// Insert payload handed to a [`crate::store::ContractStore`]
#[derive(Debug, Clone)]
pub struct NewContract {
    pub name: String,
    pub address: String,
    pub deployment_date: DateTime<Utc>,
}

/// Raw query string of `GET /api/deployed_contracts`
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListContractsParams {
    /// Case-insensitive substring of the contract name
    pub name: Option<String>,
    /// Case-insensitive substring of the contract address
    pub address: Option<String>,
    /// `field[:asc|desc]`, e.g. `deployment_date:desc`
    pub sort_by: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub limit: i64,
    pub skip: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeployedContractsResponse {
    pub data: Vec<Contract>,
    /// Rows matching the filters, ignoring pagination
    pub total: i64,
    pub page_info: PageInfo,
}

/// `0x` followed by exactly 40 hex digits, either case.
pub fn is_contract_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn validate_contract_address(address: &str) -> Result<(), ValidationError> {
    if is_contract_address(address) {
        Ok(())
    } else {
        let mut err = ValidationError::new("address");
        err.message = Some(Cow::from(
            "Invalid contract address: expected 0x followed by 40 hex digits",
        ));
        Err(err)
    }
}
