//! HTTP client for the generation service

use super::types::SubmitResponse;
use super::{GenerationError, GenerationRequest, GenerationResult, GeneratorApi, StatusRecord};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Generation service reached over HTTP/JSON
pub struct HttpGeneratorApi {
    client: Client,
    base_url: String,
}

impl HttpGeneratorApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a 2xx body, or surface the raw body text for anything else
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GeneratorApi for HttpGeneratorApi {
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint("/v1/generate"))
            .json(request)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::decode(response).await?;
        Ok(submitted.presentation_id)
    }

    async fn poll_status(&self, presentation_id: &str) -> Result<StatusRecord, GenerationError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/v1/status/{presentation_id}")))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn fetch_result(
        &self,
        presentation_id: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/v1/presentation/{presentation_id}")))
            .send()
            .await?;

        Self::decode(response).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
