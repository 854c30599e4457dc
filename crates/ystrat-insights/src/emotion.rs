//! Emotion-biased re-ranking of generated candidates.
//!
//! Pure and infallible: no network, no clock, no randomness.

use std::collections::BTreeSet;

use ystrat_models::{CandidateSet, Tone};

use crate::triggers::{tone_lexicon, trigger_ids, BANNED_PHRASES, POWER_WORDS};

const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 80;
const MIN_SURVIVORS_FOR_DROP: usize = 5;
const MAX_THUMBNAIL_WORDS: usize = 4;
const MAX_TAGS: usize = 25;
const MAX_TAG_CHARS: usize = 30;

/// What the optimizer did to the set, for observability.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankReport {
    pub triggers_applied: Vec<String>,
    pub deltas: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct EmotionOptimizer;

impl EmotionOptimizer {
    /// Re-ranks and normalizes a candidate set for a tone.
    pub fn rerank(&self, set: CandidateSet, tone: Tone) -> (CandidateSet, RerankReport) {
        let normalized: Vec<String> = set
            .titles
            .iter()
            .map(|t| normalize_title(t))
            .filter(|t| !t.is_empty())
            .collect();

        let in_window: Vec<&String> = normalized
            .iter()
            .filter(|t| {
                let len = t.chars().count();
                (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len)
            })
            .collect();

        // Drop out-of-window titles only when enough survive; otherwise
        // clamp the long ones and keep everything.
        let shaped: Vec<String> = if in_window.len() >= MIN_SURVIVORS_FOR_DROP {
            in_window.into_iter().cloned().collect()
        } else {
            normalized
                .iter()
                .map(|t| {
                    if t.chars().count() > TITLE_MAX_CHARS {
                        t.chars().take(TITLE_MAX_CHARS).collect::<String>().trim_end().to_string()
                    } else {
                        t.clone()
                    }
                })
                .collect()
        };

        let lexicon = tone_lexicon(tone);
        let mut scored: Vec<(usize, i64, String)> = shaped
            .into_iter()
            .enumerate()
            .map(|(idx, title)| {
                let score = score_title(&title, lexicon);
                (idx, score, title)
            })
            .collect();
        // Stable sort: ties keep original order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let deltas: Vec<i64> = {
            let mut deltas = vec![0i64; scored.len()];
            for (new_idx, (orig_idx, _, _)) in scored.iter().enumerate() {
                deltas[*orig_idx] = new_idx as i64 - *orig_idx as i64;
            }
            deltas
        };

        let titles: Vec<String> = scored.into_iter().map(|(_, _, t)| t).take(10).collect();

        let thumbnail_lines: Vec<String> = set
            .thumbnail_lines
            .iter()
            .map(|line| normalize_thumbnail_line(line))
            .filter(|line| !line.is_empty())
            .take(5)
            .collect();

        let tags = normalize_tags(&set.tags);

        let result = CandidateSet {
            titles,
            descriptions: set.descriptions,
            tags,
            thumbnail_lines,
            source: set.source,
            confidence: set.confidence,
        };
        let report = RerankReport {
            triggers_applied: trigger_ids(tone),
            deltas,
        };
        (result, report)
    }
}

/// Strips markdown decoration and list markers, collapses whitespace.
fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`' | '"'))
        .collect();
    let stripped = stripped
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')' || c == '-' || c == ' ');
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn score_title(title: &str, lexicon: &[&str]) -> i64 {
    let lower = title.to_lowercase();
    let mut score = 0i64;

    for word in lexicon {
        if lower.contains(word) {
            score += 2;
        }
    }
    if title.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if POWER_WORDS.iter().any(|w| lower.contains(w)) {
        score += 1;
    }
    if BANNED_PHRASES.iter().any(|p| lower.contains(p)) {
        score -= 3;
    }
    score
}

fn normalize_thumbnail_line(line: &str) -> String {
    line.split_whitespace()
        .take(MAX_THUMBNAIL_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Lowercases, strips punctuation except internal hyphens, deduplicates
/// and caps the tag set.
fn normalize_tags(tags: &BTreeSet<String>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for tag in tags {
        let lowered = tag.to_lowercase();
        let cleaned: String = lowered
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == ' ' || c == '-' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let cleaned = cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches('-')
            .to_string();
        if cleaned.is_empty() || cleaned.chars().count() > MAX_TAG_CHARS {
            continue;
        }
        out.insert(cleaned);
        if out.len() >= MAX_TAGS {
            break;
        }
    }
    out
}
