//! Generation error types

use thiserror::Error;

/// Placeholder when a failed job carries no `error_message`
pub const UNKNOWN_JOB_ERROR: &str = "Неизвестная ошибка";

/// Failure of a generation run
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Non-2xx response; `body` is the raw response text
    #[error("generation service responded with HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The job itself reached the "error" status
    #[error("{0}")]
    Job(String),

    /// The request could not be sent or the response could not be read
    #[error("generation service request failed: {0}")]
    Network(String),

    /// Optional poll limit reached while the job was still running
    #[error("job still in progress after {attempts} status checks")]
    PollLimitExceeded { attempts: u32 },

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn job(message: Option<String>) -> Self {
        Self::Job(message.unwrap_or_else(|| UNKNOWN_JOB_ERROR.to_string()))
    }

    /// Text shown to the user; `Display` stays in English for logs
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { status, body } => format!("сервер ответил {status}: {body}"),
            Self::Job(message) => message.clone(),
            Self::Network(_) => "не удалось связаться с сервером генерации".to_string(),
            Self::PollLimitExceeded { attempts } => {
                format!("презентация не готова после {attempts} проверок статуса")
            }
            Self::Cancelled => "генерация прервана, бот остановлен".to_string(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
