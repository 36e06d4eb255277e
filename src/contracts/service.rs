use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::contracts::query::ContractFilter;
use crate::error::ApiError;
use crate::models::{
    Contract, CreateContractRequest, DeployedContractsResponse, ListContractsParams, NewContract,
    PageInfo,
};
use crate::store::ContractStore;

#[derive(Clone)]
pub struct ContractService {
    store: Arc<dyn ContractStore>,
}

impl ContractService {
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        Self { store }
    }

    pub async fn create_contract(
        &self,
        request: CreateContractRequest,
    ) -> Result<Contract, ApiError> {
        request.validate()?;

        let new_contract = NewContract {
            name: request.name,
            address: request.address.to_lowercase(),
            deployment_date: request.deployment_date.unwrap_or_else(Utc::now),
        };

        let contract = self.store.insert(new_contract).await?;

        tracing::info!(
            contract_id = %contract.id,
            address = %contract.address,
            "Contract recorded"
        );

        Ok(contract)
    }

    pub async fn get_contract(&self, id: Uuid) -> Result<Contract, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Contract {} not found", id)))
    }

    pub async fn list_contracts(
        &self,
        params: ListContractsParams,
    ) -> Result<DeployedContractsResponse, ApiError> {
        params.validate()?;
        let filter =
            ContractFilter::try_from(params).map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let page = self.store.list(&filter).await?;

        Ok(DeployedContractsResponse {
            data: page.items,
            total: page.total,
            page_info: PageInfo {
                limit: filter.limit,
                skip: filter.skip,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContractStore;

    fn service() -> ContractService {
        ContractService::new(Arc::new(MemoryContractStore::new()))
    }

    fn request(name: &str, address: &str) -> CreateContractRequest {
        CreateContractRequest {
            name: name.to_string(),
            address: address.to_string(),
            deployment_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_lowercases_address() {
        let service = service();
        let contract = service
            .create_contract(request(
                "Test",
                "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            ))
            .await
            .unwrap();
        assert_eq!(contract.address, "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_duplicate_address_differing_only_in_case_conflicts() {
        let service = service();
        service
            .create_contract(request("A", "0xABCDEF0000000000000000000000000000000000"))
            .await
            .unwrap();
        let err = service
            .create_contract(request("B", "0xabcdef0000000000000000000000000000000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_address_never_reaches_store() {
        let err = service()
            .create_contract(request("Bad", "invalid_address"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_bad_request() {
        let err = service()
            .list_contracts(ListContractsParams {
                sort_by: Some("invalid_field:desc".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            ApiError::BadRequest(message) => assert!(message.contains("Invalid sort field")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_contract_is_not_found() {
        let err = service().get_contract(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
