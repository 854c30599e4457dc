//! Strategy pipeline coordinator.
//!
//! Orchestrates validation, keyword mining, gap detection, prompt
//! assembly, generation, re-ranking and persistence for one invocation,
//! with the partial-failure policy: validation and storage failures are
//! fatal, best-effort upstream failures degrade.

pub mod config;
pub mod error;
pub mod runner;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use runner::StrategyPipeline;
