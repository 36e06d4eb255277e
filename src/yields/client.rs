use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::YieldError;

#[derive(Deserialize)]
struct PoolsResponse {
    data: Vec<Value>,
}

/// Client for the yield aggregator's pool listing
#[derive(Clone)]
pub struct YieldsClient {
    client: Client,
    api_url: String,
}

impl YieldsClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, YieldError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Every pool record in the response's `data` array, untouched
    pub async fn fetch_pools(&self) -> Result<Vec<Value>, YieldError> {
        tracing::info!(url = %self.api_url, "Fetching yields data");

        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await?
            .error_for_status()?;

        let body: PoolsResponse = response.json().await?;
        tracing::debug!(pools = body.data.len(), "Yields data received");
        Ok(body.data)
    }
}
