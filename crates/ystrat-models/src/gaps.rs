//! Content-gap models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A topic competitors cover more than the creator does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub topic: String,
    pub competitor_frequency: u64,
    pub creator_frequency: u64,
    pub opportunity_score: f64,
    pub rationale: String,
}

/// Output of the gap detection step.
///
/// `gaps` is ordered by opportunity score descending, competitor frequency
/// descending, topic ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapBundle {
    pub gaps: Vec<Gap>,
    pub creator_strengths: BTreeSet<String>,
}

impl GapBundle {
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty() && self.creator_strengths.is_empty()
    }

    pub fn top_topics(&self, n: usize) -> Vec<&str> {
        self.gaps.iter().take(n).map(|g| g.topic.as_str()).collect()
    }
}
