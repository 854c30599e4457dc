//! Pipeline configuration.
//!
//! A closed record of recognized options; no other knobs exist.

use std::path::PathBuf;

/// Configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for persisted strategies.
    pub storage_root: PathBuf,
    /// Generation endpoint; absent forces the fallback path.
    pub llm_endpoint: Option<String>,
    /// Generation API key; absent forces the fallback path.
    pub llm_api_key: Option<String>,
    /// Per-attempt generation timeout.
    pub llm_timeout_s: u64,
    /// Total generation attempts.
    pub llm_max_attempts: u32,
    /// Wall-clock deadline for the keyword enrichment fan-out.
    pub c2_total_deadline_s: u64,
    pub max_csv_bytes: u64,
    pub max_csv_rows: usize,
    pub max_cell_chars: usize,
    /// Provider memoization TTL.
    pub cache_ttl_s: u64,
    /// Provider memoization capacity.
    pub cache_capacity: usize,
    /// Suggest endpoint base URL.
    pub autocomplete_url: String,
    /// Interest endpoint URL; absent disables trend enrichment.
    pub trends_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./data"),
            llm_endpoint: None,
            llm_api_key: None,
            llm_timeout_s: 60,
            llm_max_attempts: 3,
            c2_total_deadline_s: 8,
            max_csv_bytes: 52_428_800,
            max_csv_rows: 100_000,
            max_cell_chars: 10_000,
            cache_ttl_s: 300,
            cache_capacity: 1000,
            autocomplete_url: "https://suggestqueries.google.com".to_string(),
            trends_url: None,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_root: std::env::var("YSTRAT_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            llm_endpoint: std::env::var("LLM_ENDPOINT").ok().filter(|s| !s.is_empty()),
            llm_api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            llm_timeout_s: env_parse("LLM_TIMEOUT_S", defaults.llm_timeout_s),
            llm_max_attempts: env_parse("LLM_MAX_ATTEMPTS", defaults.llm_max_attempts),
            c2_total_deadline_s: env_parse("YSTRAT_C2_DEADLINE_S", defaults.c2_total_deadline_s),
            max_csv_bytes: env_parse("YSTRAT_MAX_CSV_BYTES", defaults.max_csv_bytes),
            max_csv_rows: env_parse("YSTRAT_MAX_CSV_ROWS", defaults.max_csv_rows),
            max_cell_chars: env_parse("YSTRAT_MAX_CELL_CHARS", defaults.max_cell_chars),
            cache_ttl_s: env_parse("YSTRAT_CACHE_TTL_S", defaults.cache_ttl_s),
            cache_capacity: env_parse("YSTRAT_CACHE_CAPACITY", defaults.cache_capacity),
            autocomplete_url: std::env::var("YSTRAT_AUTOCOMPLETE_URL")
                .unwrap_or(defaults.autocomplete_url),
            trends_url: std::env::var("YSTRAT_TRENDS_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
