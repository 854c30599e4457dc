//! Ingest error types.

use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

/// Errors raised while validating tabular input.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Structurally unusable input: unreadable file, broken CSV, missing
    /// title column, zero usable rows.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A security rule matched. The whole file is rejected.
    #[error("hostile input ({rule}): {detail}")]
    HostileInput {
        rule: &'static str,
        detail: String,
    },

    /// Size or row-count limit exceeded.
    #[error("input too large: {0}")]
    TooLarge(String),
}

impl IngestError {
    pub fn hostile(rule: &'static str, detail: impl Into<String>) -> Self {
        Self::HostileInput {
            rule,
            detail: detail.into(),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
