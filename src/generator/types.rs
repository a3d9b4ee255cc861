//! Wire types for the generation service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every presentation is generated with this many slides
pub const SLIDES_COUNT: u32 = 7;

/// Sent when the user never provided a style
pub const UNSPECIFIED_STYLE: &str = "unspecified";

/// Body of `POST /v1/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub style: String,
    pub slides_count: u32,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, style: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            style: style.unwrap_or_else(|| UNSPECIFIED_STYLE.to_string()),
            slides_count: SLIDES_COUNT,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SubmitResponse {
    pub presentation_id: String,
}

/// Body of `GET /v1/status/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusRecord {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error_message: Some(message.into()),
        }
    }

    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }
}

/// Job status; the server's enum is open, so unknown values mean "still running"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Error,
    InProgress,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::InProgress)
    }
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        match status {
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::InProgress,
        }
    }
}

/// Body of `GET /v1/presentation/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Artifact location, relative to the service or absolute
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: Map::new(),
        }
    }

    /// Artifact location with relative paths joined onto `base_url`
    pub fn artifact_url(&self, base_url: &str) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            return self.url.clone();
        }
        let base = base_url.trim_end_matches('/');
        if self.url.starts_with('/') {
            format!("{base}{}", self.url)
        } else {
            format!("{base}/{}", self.url)
        }
    }
}
