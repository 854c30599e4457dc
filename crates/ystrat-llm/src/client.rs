//! HTTP client for the text-generation endpoint.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ystrat_ingest::sanitize_text;
use ystrat_models::{Brief, CandidateSet, CandidateSource, KeywordBundle, Prompt};

use crate::error::{LlmError, LlmResult};
use crate::fallback::fallback_candidates;

/// Configuration for the LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Generation endpoint URL. Absent means the step falls back.
    pub endpoint: Option<String>,
    /// Bearer token. Absent means the step falls back.
    pub api_key: Option<String>,
    /// Per-attempt wall clock.
    pub timeout: Duration,
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Backoff base; doubles per attempt up to `backoff_cap`, with full
    /// jitter applied.
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("LLM_ENDPOINT").ok().filter(|s| !s.is_empty()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_attempts: std::env::var("LLM_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            ..Self::default()
        }
    }
}

/// Seam for the generation call so tests and the pipeline can substitute
/// deterministic implementations.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt, cancel: &CancellationToken) -> LlmResult<CandidateSet>;
}

/// Client for the external text-generation service.
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LlmError::Network)?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> LlmResult<Self> {
        Self::new(LlmConfig::from_env())
    }

    async fn attempt(&self, endpoint: &str, key: &str, prompt_text: &str) -> LlmResult<CandidateSet> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(key)
            .json(&serde_json::json!({ "prompt": prompt_text }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LlmError::Rejected(format!("authentication failed ({status})")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        parse_candidates(&body)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &Prompt, cancel: &CancellationToken) -> LlmResult<CandidateSet> {
        let (endpoint, key) = match (&self.config.endpoint, &self.config.api_key) {
            (Some(endpoint), Some(key)) => (endpoint.as_str(), key.as_str()),
            _ => return Err(LlmError::NotConfigured),
        };

        let prompt_text = sanitize_text(&prompt.text);
        let mut attempt = 0u32;
        let mut schema_retry_used = false;

        loop {
            if cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }

            match self.attempt(endpoint, key, &prompt_text).await {
                Ok(set) => {
                    debug!(titles = set.titles.len(), "llm generation succeeded");
                    return Ok(set);
                }
                // A schema-invalid body gets exactly one extra soft retry.
                Err(err @ LlmError::Schema(_)) => {
                    if schema_retry_used {
                        return Err(err);
                    }
                    warn!(error = %err, "schema-invalid response, retrying once");
                    schema_retry_used = true;
                }
                Err(err) if err.is_retryable() && attempt + 1 < self.config.max_attempts => {
                    attempt += 1;
                    let delay = backoff_delay(attempt, self.config.backoff_base, self.config.backoff_cap);
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient llm failure, backing off"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(LlmError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Exponential backoff with full jitter: a uniform draw from zero up to
/// `base * 2^(attempt-1)`, capped.
fn backoff_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let exp = base.saturating_mul(1u32 << (attempt - 1).min(10));
    let ceiling = exp.min(cap);
    let millis = ceiling.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
}

#[derive(Deserialize)]
struct RawCandidates {
    titles: Vec<String>,
    #[serde(default)]
    descriptions: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    thumbnail_lines: Vec<String>,
}

#[derive(Deserialize)]
struct TextEnvelope {
    text: String,
}

/// Parses a response body into a candidate set. Accepts the candidate
/// schema directly, or a `{"text": "..."}` envelope whose text contains
/// that JSON document.
pub(crate) fn parse_candidates(body: &str) -> LlmResult<CandidateSet> {
    let raw: RawCandidates = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(_) => {
            let envelope: TextEnvelope = serde_json::from_str(body)
                .map_err(|e| LlmError::Schema(format!("not candidate JSON or a text envelope: {e}")))?;
            let inner = extract_json_object(&envelope.text)
                .ok_or_else(|| LlmError::Schema("envelope text carries no JSON object".into()))?;
            serde_json::from_str(inner)
                .map_err(|e| LlmError::Schema(format!("envelope JSON invalid: {e}")))?
        }
    };

    if raw.titles.iter().all(|t| t.trim().is_empty()) {
        return Err(LlmError::Schema("response has no titles".into()));
    }
    Ok(normalize_candidates(raw))
}

/// The widest `{...}` span in a text blob, tolerating prose around the
/// JSON the way chat models tend to answer.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Enforces the candidate-set cardinalities and shapes on a parsed
/// response.
fn normalize_candidates(raw: RawCandidates) -> CandidateSet {
    let titles: Vec<String> = raw
        .titles
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(10)
        .collect();

    let descriptions: Vec<String> = raw
        .descriptions
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(|d| {
            if d.chars().count() > 400 {
                d.chars().take(400).collect()
            } else {
                d.to_string()
            }
        })
        .filter(|d| d.chars().count() >= 150)
        .take(5)
        .collect();

    let tags: BTreeSet<String> = raw
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| {
            let len = t.chars().count();
            len >= 1 && len <= 30
        })
        .take(25)
        .collect();

    let thumbnail_lines: Vec<String> = raw
        .thumbnail_lines
        .iter()
        .map(|l| l.split_whitespace().take(4).collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .take(5)
        .collect();

    CandidateSet {
        titles,
        descriptions,
        tags,
        thumbnail_lines,
        source: CandidateSource::Llm,
        confidence: 0.85,
    }
}

/// C5 policy wrapper: generation with the deterministic fallback.
///
/// Returns the candidate set and whether the step degraded into fallback.
/// The only error that escapes is cancellation.
pub async fn generate_with_fallback(
    generator: &dyn TextGenerator,
    prompt: &Prompt,
    brief: &Brief,
    keywords: &KeywordBundle,
    cancel: &CancellationToken,
) -> LlmResult<(CandidateSet, bool)> {
    match generator.generate(prompt, cancel).await {
        Ok(set) => Ok((set, false)),
        Err(LlmError::Cancelled) => Err(LlmError::Cancelled),
        Err(err) => {
            warn!(error = %err, "llm unavailable, using fallback candidates");
            Ok((fallback_candidates(brief, keywords), true))
        }
    }
}
