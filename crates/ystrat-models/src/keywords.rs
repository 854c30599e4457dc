//! Keyword bundle models.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Detected title language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Bn,
    Other,
}

/// One mined keyword with its frequency and the row indices it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    pub frequency: u64,
    pub source_rows: Vec<usize>,
}

/// Trend enrichment for a single term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStat {
    pub avg_interest: f64,
    pub peak_interest: f64,
    pub rising: bool,
}

/// Output of the keyword analysis step.
///
/// `keywords` is ordered by frequency descending then term ascending;
/// `suggestions` and `trends` use ordered collections so serialized output
/// iterates in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordBundle {
    pub keywords: Vec<KeywordEntry>,
    pub suggestions: BTreeSet<String>,
    pub trends: BTreeMap<String, TrendStat>,
    pub language: Language,
}

impl KeywordBundle {
    /// Frequency of a term in this bundle, 0 if absent.
    pub fn frequency_of(&self, term: &str) -> u64 {
        self.keywords
            .iter()
            .find(|k| k.term == term)
            .map(|k| k.frequency)
            .unwrap_or(0)
    }

    /// Top terms in bundle order.
    pub fn top_terms(&self, n: usize) -> Vec<&str> {
        self.keywords.iter().take(n).map(|k| k.term.as_str()).collect()
    }
}
