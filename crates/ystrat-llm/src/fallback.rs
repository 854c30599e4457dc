//! Deterministic fallback candidates.
//!
//! Built from the mined keywords and the brief alone, with no network
//! involved. Always satisfies the candidate-set invariants.

use std::collections::BTreeSet;

use ystrat_insights::triggers::fallback_title_patterns;
use ystrat_models::{Brief, CandidateSet, CandidateSource, KeywordBundle};

const FALLBACK_CONFIDENCE: f64 = 0.4;

/// Builds the fallback candidate set for a failed generation step.
pub fn fallback_candidates(brief: &Brief, keywords: &KeywordBundle) -> CandidateSet {
    let terms: Vec<String> = keywords
        .keywords
        .iter()
        .take(5)
        .map(|k| k.term.clone())
        .collect();
    let primary = terms
        .first()
        .cloned()
        .unwrap_or_else(|| "content strategy".to_string());

    let patterns = fallback_title_patterns(brief.tone);
    let titles: Vec<String> = patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| {
            let term = terms.get(i % terms.len().max(1)).unwrap_or(&primary);
            pattern
                .replace("{kw}", &title_case(term))
                .replace("{goal}", &brief.goal)
        })
        .collect();

    let descriptions: Vec<String> = vec![
        format!(
            "Everything you need to make progress on \"{goal}\". This video walks {audience} \
through the approach step by step, from the fundamentals of {primary} to the details that \
actually move the numbers, with concrete examples you can reuse on your own channel today.",
            goal = brief.goal,
            audience = brief.audience,
            primary = primary,
        ),
        format!(
            "A practical deep dive into {primary} made for {audience}. We break the topic into \
plain, watchable steps, show the mistakes most channels make along the way, and finish with a \
checklist you can apply immediately no matter where your channel stands right now.",
            primary = primary,
            audience = brief.audience,
        ),
    ]
    .into_iter()
    .map(|d| clamp_chars(&d, 400))
    .collect();

    let mut tags: BTreeSet<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    for extra in ["tutorial", "guide", "tips", "strategy", "youtube"] {
        if tags.len() >= 25 {
            break;
        }
        tags.insert(extra.to_string());
    }

    let thumbnail_lines = vec![
        title_case(&primary).to_uppercase(),
        "STEP BY STEP".to_string(),
        "WATCH THIS FIRST".to_string(),
    ];

    CandidateSet {
        titles,
        descriptions,
        tags,
        thumbnail_lines,
        source: CandidateSource::Fallback,
        confidence: FALLBACK_CONFIDENCE,
    }
}

fn clamp_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

fn title_case(term: &str) -> String {
    term.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
