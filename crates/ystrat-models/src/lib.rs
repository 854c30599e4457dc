//! Shared data models for the ystrat backend.
//!
//! This crate provides Serde-serializable types for:
//! - Creative briefs and the closed tone set
//! - Validated creator rows
//! - Keyword and gap bundles
//! - Prompts and candidate sets
//! - Persisted strategy records and index summaries
//! - Fingerprint / id helpers

pub mod brief;
pub mod candidates;
pub mod gaps;
pub mod ids;
pub mod keywords;
pub mod prompt;
pub mod row;
pub mod strategy;

// Re-export common types
pub use brief::{Brief, BriefError, Tone, ToneParseError};
pub use candidates::{CandidateSet, CandidateSource};
pub use gaps::{Gap, GapBundle};
pub use ids::{correlation_id, input_fingerprint, strategy_id, utc_now_secs};
pub use keywords::{KeywordBundle, KeywordEntry, Language, TrendStat};
pub use prompt::{Prompt, PromptMetadata};
pub use row::CreatorRow;
pub use strategy::{PipelineStats, PsychMetadata, Strategy, StrategySummary};
