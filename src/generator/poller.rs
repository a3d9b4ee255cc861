//! Submit-and-poll orchestration

use super::{GenerationError, GenerationRequest, GenerationResult, GeneratorApi};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How status polling is paced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up after this many status checks. `None` polls until the job
    /// reaches a terminal status.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Source of the delay between polls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives one generation job from submission to result
pub struct Generator<A, S> {
    api: A,
    sleeper: S,
    policy: PollPolicy,
}

impl<A, S> Generator<A, S>
where
    A: GeneratorApi,
    S: Sleeper,
{
    pub fn new(api: A, sleeper: S, policy: PollPolicy) -> Self {
        Self {
            api,
            sleeper,
            policy,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submit `request`, wait for the job to finish and fetch its result
    ///
    /// Polling stops at the first "completed" or "error" status. Any other
    /// status waits one interval and polls again, without limit unless
    /// `max_attempts` is set. `cancel` aborts at the next await point.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenerationError> {
        let presentation_id = cancellable(cancel, self.api.submit(request)).await?;

        let mut attempts: u32 = 0;
        let record = loop {
            let record = cancellable(cancel, self.api.poll_status(&presentation_id)).await?;
            attempts += 1;

            if record.job_status().is_terminal() {
                break record;
            }
            tracing::debug!(
                presentation_id = %presentation_id,
                attempt = attempts,
                status = %record.status,
                "Generation job still running"
            );

            if let Some(max_attempts) = self.policy.max_attempts {
                if attempts >= max_attempts {
                    tracing::warn!(
                        presentation_id = %presentation_id,
                        attempts,
                        "Giving up on generation job"
                    );
                    return Err(GenerationError::PollLimitExceeded { attempts });
                }
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(GenerationError::Cancelled),
                () = self.sleeper.sleep(self.policy.interval) => {}
            }
        };

        tracing::info!(
            presentation_id = %presentation_id,
            status = %record.status,
            attempts,
            "Generation job finished"
        );

        if record.job_status() == super::JobStatus::Completed {
            cancellable(cancel, self.api.fetch_result(&presentation_id)).await
        } else {
            Err(GenerationError::job(record.error_message))
        }
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T, GenerationError>>,
) -> Result<T, GenerationError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(GenerationError::Cancelled),
        result = operation => result,
    }
}
