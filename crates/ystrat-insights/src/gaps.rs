//! Competitor content-gap detection.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use ystrat_models::{Gap, GapBundle, KeywordBundle};

/// Compares the creator's keyword distribution against competitor bundles
/// and ranks the topics competitors cover more heavily.
pub struct GapDetector {
    min_score: f64,
    max_gaps: usize,
    max_strengths: usize,
}

impl Default for GapDetector {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            max_gaps: 20,
            max_strengths: 20,
        }
    }
}

impl GapDetector {
    /// Rising terms in the creator's own trends map earn this score bonus.
    const RISING_BONUS: f64 = 0.2;

    pub fn detect(&self, creator: &KeywordBundle, competitors: &[KeywordBundle]) -> GapBundle {
        if competitors.is_empty() {
            return GapBundle::default();
        }

        // Max frequency per term across all competitor bundles.
        let mut competitor_freq: BTreeMap<&str, u64> = BTreeMap::new();
        for bundle in competitors {
            for entry in &bundle.keywords {
                let slot = competitor_freq.entry(entry.term.as_str()).or_insert(0);
                *slot = (*slot).max(entry.frequency);
            }
        }

        let mut gaps = Vec::new();
        for (term, &cf) in &competitor_freq {
            let mf = creator.frequency_of(term);
            let mut score = (cf.saturating_sub(mf)) as f64 / cf.max(1) as f64;
            if creator.trends.get(*term).is_some_and(|t| t.rising) {
                score += Self::RISING_BONUS;
            }
            let score = score.clamp(0.0, 1.0);
            if score < self.min_score {
                continue;
            }
            gaps.push(Gap {
                topic: term.to_string(),
                competitor_frequency: cf,
                creator_frequency: mf,
                opportunity_score: score,
                rationale: format!(
                    "competitors cover \"{term}\" in {cf} title(s), you cover it in {mf}"
                ),
            });
        }

        gaps.sort_by(|a, b| {
            b.opportunity_score
                .total_cmp(&a.opportunity_score)
                .then(b.competitor_frequency.cmp(&a.competitor_frequency))
                .then(a.topic.cmp(&b.topic))
        });
        gaps.truncate(self.max_gaps);

        // Strengths: terms only the creator covers, strongest first.
        let mut strengths = BTreeSet::new();
        for entry in &creator.keywords {
            if strengths.len() >= self.max_strengths {
                break;
            }
            if entry.frequency > 0 && !competitor_freq.contains_key(entry.term.as_str()) {
                strengths.insert(entry.term.clone());
            }
        }

        debug!(gaps = gaps.len(), strengths = strengths.len(), "gap detection complete");
        GapBundle {
            gaps,
            creator_strengths: strengths,
        }
    }
}
