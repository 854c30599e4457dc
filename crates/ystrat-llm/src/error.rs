//! LLM client error types.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Endpoint or API key missing from the environment. The generation
    /// step falls back without a network call.
    #[error("llm endpoint or api key not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Authentication/authorization or malformed-request rejection.
    /// Never retried.
    #[error("llm rejected the request: {0}")]
    Rejected(String),

    /// Response body did not conform to the candidate schema.
    #[error("response did not match the candidate schema: {0}")]
    Schema(String),

    #[error("cancelled")]
    Cancelled,
}

impl LlmError {
    /// Transient errors worth another attempt after back-off: network
    /// failures, 5xx, and documented rate limiting. Auth and schema
    /// errors are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Status { status, .. } => *status >= 500 || *status == 429,
            LlmError::NotConfigured
            | LlmError::Rejected(_)
            | LlmError::Schema(_)
            | LlmError::Cancelled => false,
        }
    }
}
