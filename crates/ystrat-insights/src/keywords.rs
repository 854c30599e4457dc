//! Keyword mining and best-effort enrichment.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ystrat_models::{CreatorRow, KeywordBundle, KeywordEntry, Language};

use crate::providers::{AutocompleteProvider, TrendsProvider};
use crate::stopwords::stopwords;

/// Degraded-step name recorded when enrichment misses its deadline or any
/// provider fails.
pub const ENRICHMENT_STEP: &str = "keywords.enrichment";

const MAX_KEYWORDS: usize = 50;
const MIN_TOKEN_CHARS: usize = 3;

/// Mines keywords from titles and enriches the top terms with suggestions
/// and trend statistics under a single wall-clock deadline.
pub struct KeywordAnalyzer {
    autocomplete: Arc<dyn AutocompleteProvider>,
    trends: Arc<dyn TrendsProvider>,
    enrich_terms: usize,
    deadline: Duration,
}

impl KeywordAnalyzer {
    pub fn new(
        autocomplete: Arc<dyn AutocompleteProvider>,
        trends: Arc<dyn TrendsProvider>,
        deadline: Duration,
    ) -> Self {
        Self {
            autocomplete,
            trends,
            enrich_terms: 10,
            deadline,
        }
    }

    pub fn with_enrich_terms(mut self, n: usize) -> Self {
        self.enrich_terms = n;
        self
    }

    /// Mines a keyword bundle from titles without touching the network.
    /// Used for competitor bundles, which never get enrichment.
    pub fn mine(&self, rows: &[CreatorRow], language_hint: Option<&str>) -> KeywordBundle {
        let language = resolve_language(rows, language_hint);
        let keywords = mine_keywords(rows, language);
        KeywordBundle {
            keywords,
            suggestions: Default::default(),
            trends: BTreeMap::new(),
            language,
        }
    }

    /// Full analysis: mining plus provider fan-out. Returns the bundle and
    /// the degraded step names (empty when every provider answered in time).
    pub async fn analyze(
        &self,
        rows: &[CreatorRow],
        language_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> (KeywordBundle, Vec<String>) {
        let mut bundle = self.mine(rows, language_hint);
        let mut degraded = Vec::new();

        let terms: Vec<String> = bundle
            .keywords
            .iter()
            .take(self.enrich_terms)
            .map(|k| k.term.clone())
            .collect();
        if terms.is_empty() {
            return (bundle, degraded);
        }

        let enrichment = async {
            let suggest_futs = terms.iter().map(|t| self.autocomplete.suggest(t));
            let trend_futs = terms.iter().map(|t| self.trends.interest(t));
            tokio::join!(join_all(suggest_futs), join_all(trend_futs))
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("keyword enrichment skipped: invocation cancelled");
                None
            }
            result = tokio::time::timeout(self.deadline, enrichment) => {
                if result.is_err() {
                    warn!(
                        deadline_s = self.deadline.as_secs(),
                        "keyword enrichment missed its deadline"
                    );
                }
                result.ok()
            }
        };

        match outcome {
            Some((suggestions, trends)) => {
                let mut any_miss = false;
                for result in suggestions {
                    match result {
                        Ok(items) => {
                            for item in items {
                                bundle.suggestions.insert(item.to_lowercase());
                            }
                        }
                        Err(err) => {
                            debug!(error = %err, "autocomplete miss");
                            any_miss = true;
                        }
                    }
                }
                for (term, result) in terms.iter().zip(trends) {
                    match result {
                        Ok(stat) => {
                            bundle.trends.insert(term.clone(), stat);
                        }
                        Err(err) => {
                            debug!(term, error = %err, "trends miss");
                            any_miss = true;
                        }
                    }
                }
                if any_miss {
                    degraded.push(ENRICHMENT_STEP.to_string());
                }
            }
            None => {
                degraded.push(ENRICHMENT_STEP.to_string());
            }
        }

        (bundle, degraded)
    }
}

fn resolve_language(rows: &[CreatorRow], hint: Option<&str>) -> Language {
    match hint.map(|h| h.trim().to_ascii_lowercase()) {
        Some(h) if h == "en" => Language::En,
        Some(h) if h == "bn" => Language::Bn,
        _ => detect_language(rows),
    }
}

/// Character-class language detection over all titles.
///
/// The ratio denominator is guarded: with no meaningful characters at all
/// the result defaults to English without dividing.
fn detect_language(rows: &[CreatorRow]) -> Language {
    let mut bengali = 0usize;
    let mut latin = 0usize;
    for row in rows {
        for c in row.title.chars() {
            if ('\u{0980}'..='\u{09FF}').contains(&c) {
                bengali += 1;
            } else if c.is_ascii_alphabetic() {
                latin += 1;
            }
        }
    }

    let meaningful = bengali + latin;
    if meaningful == 0 {
        return Language::En;
    }
    let bengali_ratio = bengali as f64 / meaningful as f64;
    let latin_ratio = latin as f64 / meaningful as f64;
    if bengali_ratio > 0.6 {
        Language::Bn
    } else if latin_ratio > 0.6 {
        Language::En
    } else {
        Language::Other
    }
}

fn mine_keywords(rows: &[CreatorRow], language: Language) -> Vec<KeywordEntry> {
    let stops = stopwords(language);
    let mut counts: BTreeMap<String, (u64, Vec<usize>)> = BTreeMap::new();

    for (row_idx, row) in rows.iter().enumerate() {
        for token in tokenize(&row.title) {
            if token.chars().count() < MIN_TOKEN_CHARS {
                continue;
            }
            if stops.contains(&token.as_str()) {
                continue;
            }
            let entry = counts.entry(token).or_insert((0, Vec::new()));
            entry.0 += 1;
            if entry.1.last() != Some(&row_idx) {
                entry.1.push(row_idx);
            }
        }
    }

    let mut keywords: Vec<KeywordEntry> = counts
        .into_iter()
        .map(|(term, (frequency, source_rows))| KeywordEntry {
            term,
            frequency,
            source_rows,
        })
        .collect();

    // Frequency descending, then lexicographic — the BTreeMap source makes
    // the secondary order implicit, the sort key makes it explicit.
    keywords.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.term.cmp(&b.term)));
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Splits a title on non-alphanumeric boundaries. Tokens are lowercased,
/// which is a no-op for Bengali.
fn tokenize(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
