//! Fingerprint and identifier helpers.

use chrono::{DateTime, Timelike, Utc};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::brief::Brief;
use crate::row::CreatorRow;

/// Current UTC time truncated to second precision, the resolution persisted
/// in strategy timestamps and file names.
pub fn utc_now_secs() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// A fresh 16-hex correlation id for one pipeline invocation.
pub fn correlation_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..16].to_string()
}

/// Stable 16-hex fingerprint of a set of validated rows.
///
/// Rows are rendered canonically and sorted before hashing, so row order in
/// the source file does not change the fingerprint.
pub fn input_fingerprint(rows: &[CreatorRow]) -> String {
    let mut lines: Vec<String> = rows.iter().map(canonical_row).collect();
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(&hasher.finalize()[..8])
}

fn canonical_row(row: &CreatorRow) -> String {
    fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
        value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        row.title.trim(),
        opt(&row.video_id),
        opt(&row.views),
        opt(&row.likes),
        opt(&row.comments),
        row.published_at
            .map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_default(),
        opt(&row.country),
        opt(&row.ctr),
        opt(&row.avg_view_duration_s),
        opt(&row.impressions),
    )
}

/// Derives the 8-hex strategy id from the fingerprint, brief and creation
/// time. `collision` is a rehash counter; 0 for the first attempt.
pub fn strategy_id(
    fingerprint: &str,
    brief: &Brief,
    created_at: &DateTime<Utc>,
    collision: u32,
) -> String {
    let mut hasher = Sha1::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(brief.goal.as_bytes());
    hasher.update(brief.audience.as_bytes());
    hasher.update(brief.tone.as_str().as_bytes());
    hasher.update(
        created_at
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
            .as_bytes(),
    );
    if collision > 0 {
        hasher.update(collision.to_be_bytes());
    }
    hex::encode(&hasher.finalize()[..4])
}
