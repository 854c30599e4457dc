//! Validated creator rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a creator's analytics export after validation.
///
/// Only the title is required. Numeric fields keep absence distinct from
/// zero: a cell that fails coercion becomes `None`, never `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_view_duration_s: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
}

impl CreatorRow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            video_id: None,
            title: title.into(),
            views: None,
            likes: None,
            comments: None,
            published_at: None,
            country: None,
            ctr: None,
            avg_view_duration_s: None,
            impressions: None,
        }
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }
}
