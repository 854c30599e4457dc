//! Best-effort enrichment providers.
//!
//! Autocomplete and trend lookups are advisory: failures surface as
//! degraded steps, never as pipeline errors. Both HTTP providers memoize
//! results in a bounded TTL cache so repeated runs over the same channel
//! don't hammer the upstream endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use ystrat_models::TrendStat;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),

    #[error("unexpected payload: {0}")]
    Payload(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Supplies query suggestions for a seed term.
#[async_trait]
pub trait AutocompleteProvider: Send + Sync {
    async fn suggest(&self, term: &str) -> ProviderResult<Vec<String>>;
}

/// Supplies interest statistics for a term.
#[async_trait]
pub trait TrendsProvider: Send + Sync {
    async fn interest(&self, term: &str) -> ProviderResult<TrendStat>;
}

/// Bounded TTL memoization cache shared by the HTTP providers.
pub struct ProviderCache<T> {
    entries: RwLock<HashMap<String, (T, Instant)>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> ProviderCache<T> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, inserted)| inserted.elapsed() < self.ttl)
            .map(|(value, _)| value.clone())
    }

    pub async fn insert(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, inserted)| now.duration_since(*inserted) < self.ttl);

        if entries.len() >= self.capacity {
            // Evict the oldest entry to stay within capacity.
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, (_, inserted))| *inserted)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, (value, now));
    }
}

/// YouTube-flavored suggestion endpoint client.
pub struct HttpAutocomplete {
    http: Client,
    base_url: String,
    cache: Arc<ProviderCache<Vec<String>>>,
}

impl HttpAutocomplete {
    pub const DEFAULT_BASE_URL: &'static str = "https://suggestqueries.google.com";

    pub fn new(
        base_url: impl Into<String>,
        cache_capacity: usize,
        cache_ttl: Duration,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            cache: Arc::new(ProviderCache::new(cache_capacity, cache_ttl)),
        })
    }
}

#[async_trait]
impl AutocompleteProvider for HttpAutocomplete {
    async fn suggest(&self, term: &str) -> ProviderResult<Vec<String>> {
        if let Some(hit) = self.cache.get(term).await {
            debug!(term, "autocomplete cache hit");
            return Ok(hit);
        }

        let url = format!("{}/complete/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("client", "firefox"), ("ds", "yt"), ("hl", "en"), ("q", term)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let suggestions = parse_suggest_payload(&body)?;
        self.cache.insert(term.to_string(), suggestions.clone()).await;
        Ok(suggestions)
    }
}

/// Parses the suggest endpoint payload: a JSON array
/// `["seed", ["suggestion", ...]]`, optionally wrapped in JSONP parens.
fn parse_suggest_payload(body: &str) -> ProviderResult<Vec<String>> {
    let trimmed = body.trim();
    let json = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ProviderError::Payload(format!("suggest response is not JSON: {e}")))?;

    let list = value
        .get(1)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::Payload("suggest response missing suggestion array".into()))?;

    let mut out = Vec::new();
    for item in list {
        let text = match item {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Array(inner) => inner.first().and_then(|v| v.as_str()),
            _ => None,
        };
        if let Some(text) = text {
            let cleaned = text.trim().to_lowercase();
            if cleaned.chars().count() > 2 && !out.contains(&cleaned) {
                out.push(cleaned);
            }
        }
        if out.len() >= 10 {
            break;
        }
    }
    Ok(out)
}

/// Interest endpoint client. The endpoint is expected to answer
/// `GET <base>?q=<term>` with `{"avg_interest", "peak_interest", "rising"}`.
pub struct HttpTrends {
    http: Client,
    base_url: Option<String>,
    cache: Arc<ProviderCache<TrendStat>>,
}

impl HttpTrends {
    pub fn new(
        base_url: Option<String>,
        cache_capacity: usize,
        cache_ttl: Duration,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(ProviderCache::new(cache_capacity, cache_ttl)),
        })
    }
}

#[async_trait]
impl TrendsProvider for HttpTrends {
    async fn interest(&self, term: &str) -> ProviderResult<TrendStat> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(ProviderError::NotConfigured("trends endpoint"))?;

        if let Some(hit) = self.cache.get(term).await {
            debug!(term, "trends cache hit");
            return Ok(hit);
        }

        let response = self
            .http
            .get(base)
            .query(&[("q", term)])
            .send()
            .await?
            .error_for_status()?;

        let stat: TrendStat = response
            .json()
            .await
            .map_err(|e| ProviderError::Payload(format!("trends response: {e}")))?;

        if !(0.0..=100.0).contains(&stat.avg_interest) || !(0.0..=100.0).contains(&stat.peak_interest)
        {
            return Err(ProviderError::Payload(format!(
                "interest outside 0..=100 for '{term}'"
            )));
        }

        self.cache.insert(term.to_string(), stat.clone()).await;
        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_suggest_payload() {
        let body = r#"["python", ["python tutorial", "python course", "py"]]"#;
        let parsed = parse_suggest_payload(body).unwrap();
        assert_eq!(parsed, vec!["python tutorial", "python course"]);
    }

    #[test]
    fn parses_jsonp_wrapped_payload() {
        let body = r#"(["rust", [["rust tutorial"], ["rust course"]]])"#;
        let parsed = parse_suggest_payload(body).unwrap();
        assert_eq!(parsed, vec!["rust tutorial", "rust course"]);
    }

    #[test]
    fn rejects_non_json_payload() {
        assert!(parse_suggest_payload("<html>nope</html>").is_err());
    }

    #[tokio::test]
    async fn cache_returns_fresh_entries_and_expires_old_ones() {
        let cache: ProviderCache<u32> = ProviderCache::new(10, Duration::from_secs(60));
        cache.insert("a".into(), 1).await;
        assert_eq!(cache.get("a").await, Some(1));

        let expiring: ProviderCache<u32> = ProviderCache::new(10, Duration::from_millis(0));
        expiring.insert("b".into(), 2).await;
        assert_eq!(expiring.get("b").await, None);
    }

    #[tokio::test]
    async fn cache_evicts_when_over_capacity() {
        let cache: ProviderCache<u32> = ProviderCache::new(1, Duration::from_secs(60));
        cache.insert("first".into(), 1).await;
        cache.insert("second".into(), 2).await;
        assert_eq!(cache.get("second").await, Some(2));
        assert_eq!(cache.get("first").await, None);
    }

    #[tokio::test]
    async fn unconfigured_trends_provider_errors_immediately() {
        let provider = HttpTrends::new(
            None,
            10,
            Duration::from_secs(60),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(
            provider.interest("python").await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
