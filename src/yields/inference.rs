//! Hosted text-generation endpoint

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::YieldError;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
}

#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    url: String,
    token: Option<String>,
}

impl InferenceClient {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, YieldError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, YieldError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&GenerateRequest { inputs: prompt });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YieldError::Inference {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        extract_generated_text(&body)
            .map(str::to_string)
            .ok_or_else(|| YieldError::UnexpectedResponse(body.to_string()))
    }
}

/// `{"generated_text": ..}` or `[{"generated_text": ..}, ..]`
fn extract_generated_text(body: &Value) -> Option<&str> {
    let first = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };
    first.get("generated_text").and_then(Value::as_str)
}
