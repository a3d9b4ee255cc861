//! Remote presentation generation service
//!
//! Submit a job, poll its status until terminal, fetch the artifact.

mod client;
mod error;
mod poller;
mod types;

pub use client::HttpGeneratorApi;
pub use error::GenerationError;
pub use poller::{Generator, PollPolicy, Sleeper, TokioSleeper};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// The three remote operations of the generation service
///
/// Implementations hold no state between calls.
#[async_trait]
pub trait GeneratorApi: Send + Sync {
    /// Start a job, returning its `presentation_id`
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Current status of a job
    async fn poll_status(&self, presentation_id: &str) -> Result<StatusRecord, GenerationError>;

    /// Result of a completed job
    async fn fetch_result(&self, presentation_id: &str)
        -> Result<GenerationResult, GenerationError>;

    /// Base address relative artifact URLs are resolved against
    fn base_url(&self) -> &str;
}

/// Logging wrapper for generator APIs
pub struct LoggingApi {
    inner: Arc<dyn GeneratorApi>,
}

impl LoggingApi {
    pub fn new(inner: Arc<dyn GeneratorApi>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl GeneratorApi for LoggingApi {
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();
        let result = self.inner.submit(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(presentation_id) => tracing::info!(
                presentation_id = %presentation_id,
                duration_ms = %duration.as_millis(),
                slides_count = request.slides_count,
                "Generation job submitted"
            ),
            Err(e) => tracing::error!(
                duration_ms = %duration.as_millis(),
                error = %e,
                "Generation submit failed"
            ),
        }

        result
    }

    async fn poll_status(&self, presentation_id: &str) -> Result<StatusRecord, GenerationError> {
        let result = self.inner.poll_status(presentation_id).await;

        match &result {
            Ok(record) => tracing::debug!(
                presentation_id = %presentation_id,
                status = %record.status,
                "Generation status polled"
            ),
            Err(e) => tracing::error!(
                presentation_id = %presentation_id,
                error = %e,
                "Generation status poll failed"
            ),
        }

        result
    }

    async fn fetch_result(
        &self,
        presentation_id: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let result = self.inner.fetch_result(presentation_id).await;

        match &result {
            Ok(artifact) => tracing::info!(
                presentation_id = %presentation_id,
                url = %artifact.url,
                "Generation result fetched"
            ),
            Err(e) => tracing::error!(
                presentation_id = %presentation_id,
                error = %e,
                "Generation result fetch failed"
            ),
        }

        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
