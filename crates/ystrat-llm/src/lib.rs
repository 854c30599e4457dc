//! Text-generation client with retry, sanitization and deterministic
//! fallback.

pub mod client;
pub mod error;
pub mod fallback;

pub use client::{generate_with_fallback, LlmClient, LlmConfig, TextGenerator};
pub use error::{LlmError, LlmResult};
pub use fallback::fallback_candidates;
