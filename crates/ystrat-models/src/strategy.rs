//! Persisted strategy record and index summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::brief::{Brief, Tone};
use crate::candidates::CandidateSet;
use crate::gaps::GapBundle;
use crate::keywords::KeywordBundle;

/// Psychological conditioning applied during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychMetadata {
    pub tone: Tone,
    pub triggers_applied: Vec<String>,
    pub rerank_deltas: Vec<i64>,
}

/// Timing and degradation record for one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub duration_ms: u64,
    pub step_timings_ms: BTreeMap<String, u64>,
    pub degraded_steps: Vec<String>,
}

/// The complete persisted artifact of one pipeline run. Read-only once
/// written; corrections are new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub brief: Brief,
    pub input_fingerprint: String,
    pub keywords: KeywordBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaps: Option<GapBundle>,
    pub candidates: CandidateSet,
    pub psychological_metadata: PsychMetadata,
    pub pipeline: PipelineStats,
    pub version: u32,
}

impl Strategy {
    pub const CURRENT_VERSION: u32 = 1;

    /// The file stem used for this strategy on disk: `<id>_<iso-utc>`.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.id, self.created_at.format("%Y-%m-%dT%H:%M:%SZ"))
    }

    pub fn summary(&self, path: impl Into<String>) -> StrategySummary {
        StrategySummary {
            id: self.id.clone(),
            created_at: self.created_at,
            goal: self.brief.goal.clone(),
            tone: self.brief.tone,
            input_fingerprint: self.input_fingerprint.clone(),
            path: path.into(),
        }
    }
}

/// One row of the store's side index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub goal: String,
    pub tone: Tone,
    pub input_fingerprint: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::CandidateSource;
    use crate::ids::utc_now_secs;

    fn sample_strategy() -> Strategy {
        Strategy {
            id: "a1b2c3d4".to_string(),
            created_at: utc_now_secs(),
            brief: Brief::new("Grow subscribers", "developers", Tone::Authority),
            input_fingerprint: "0123456789abcdef".to_string(),
            keywords: KeywordBundle::default(),
            gaps: Some(GapBundle::default()),
            candidates: CandidateSet {
                titles: vec!["A perfectly reasonable strategy title".to_string()],
                descriptions: vec![],
                tags: Default::default(),
                thumbnail_lines: vec![],
                source: CandidateSource::Fallback,
                confidence: 0.4,
            },
            psychological_metadata: PsychMetadata {
                tone: Tone::Authority,
                triggers_applied: vec!["credential".to_string()],
                rerank_deltas: vec![0],
            },
            pipeline: PipelineStats::default(),
            version: Strategy::CURRENT_VERSION,
        }
    }

    #[test]
    fn serde_round_trip_preserves_strategy() {
        let strategy = sample_strategy();
        let json = serde_json::to_string_pretty(&strategy).unwrap();
        let back: Strategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, strategy);
    }

    #[test]
    fn file_stem_matches_expected_shape() {
        let strategy = sample_strategy();
        let stem = strategy.file_stem();
        assert!(stem.starts_with("a1b2c3d4_"));
        assert!(stem.ends_with('Z'));
        // 8 hex + '_' + "YYYY-MM-DDTHH:MM:SSZ"
        assert_eq!(stem.len(), 8 + 1 + 20);
    }
}
