//! Candidate set models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Where a candidate set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Llm,
    Fallback,
}

/// The structured output of the generation step after schema validation.
///
/// Invariants: at least one title is always present; a fallback set never
/// reports confidence above 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub titles: Vec<String>,
    pub descriptions: Vec<String>,
    pub tags: BTreeSet<String>,
    pub thumbnail_lines: Vec<String>,
    pub source: CandidateSource,
    pub confidence: f64,
}

impl CandidateSet {
    /// Checks the structural invariants of a candidate set.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.titles.is_empty() {
            return Err("candidate set has no titles".to_string());
        }
        if self.titles.len() > 10 {
            return Err(format!("too many titles: {}", self.titles.len()));
        }
        if self.descriptions.len() > 5 {
            return Err(format!("too many descriptions: {}", self.descriptions.len()));
        }
        if self.tags.len() > 25 {
            return Err(format!("too many tags: {}", self.tags.len()));
        }
        if self.thumbnail_lines.len() > 5 {
            return Err(format!(
                "too many thumbnail lines: {}",
                self.thumbnail_lines.len()
            ));
        }
        if self.source == CandidateSource::Fallback && self.confidence > 0.5 {
            return Err(format!(
                "fallback confidence {} exceeds 0.5",
                self.confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_set(source: CandidateSource, confidence: f64) -> CandidateSet {
        CandidateSet {
            titles: vec!["A title".to_string()],
            descriptions: vec![],
            tags: BTreeSet::new(),
            thumbnail_lines: vec![],
            source,
            confidence,
        }
    }

    #[test]
    fn empty_titles_violate_invariants() {
        let mut set = minimal_set(CandidateSource::Llm, 0.8);
        set.titles.clear();
        assert!(set.check_invariants().is_err());
    }

    #[test]
    fn fallback_confidence_is_capped() {
        let set = minimal_set(CandidateSource::Fallback, 0.9);
        assert!(set.check_invariants().is_err());
        let ok = minimal_set(CandidateSource::Fallback, 0.4);
        assert!(ok.check_invariants().is_ok());
    }
}
