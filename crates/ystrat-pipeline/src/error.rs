//! Pipeline error taxonomy.

use thiserror::Error;

use ystrat_ingest::IngestError;
use ystrat_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Creator CSV or brief rejected; nothing was persisted.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Persistence failed; nothing was persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Caller requested stop; nothing was persisted.
    #[error("cancelled")]
    Cancelled,

    /// Building components from configuration failed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Process exit code the CLI maps this error to.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Ingest(IngestError::InvalidInput(_))
            | PipelineError::Ingest(IngestError::HostileInput { .. }) => 2,
            PipelineError::Ingest(IngestError::TooLarge(_)) => 3,
            _ => 1,
        }
    }
}
