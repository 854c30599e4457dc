//! Analysis stages of the strategy pipeline.
//!
//! This crate provides:
//! - Keyword mining with best-effort autocomplete/trends enrichment
//! - Competitor gap detection
//! - Deterministic prompt assembly with psychological trigger blocks
//! - The pure emotion re-ranker applied to generated candidates

pub mod emotion;
pub mod gaps;
pub mod keywords;
pub mod prompt;
pub mod providers;
pub mod stopwords;
pub mod triggers;

pub use emotion::{EmotionOptimizer, RerankReport};
pub use gaps::GapDetector;
pub use keywords::KeywordAnalyzer;
pub use prompt::{PromptBuilder, TEMPLATE_VERSION};
pub use providers::{
    AutocompleteProvider, HttpAutocomplete, HttpTrends, ProviderCache, ProviderError,
    TrendsProvider,
};
