//! Creator/competitor CSV validation.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use ystrat_models::CreatorRow;

use crate::error::{IngestError, IngestResult};
use crate::scan::scan_cell;

/// Size and shape limits applied to uploaded CSVs.
#[derive(Debug, Clone)]
pub struct IngestLimits {
    pub max_bytes: u64,
    pub max_rows: usize,
    pub max_cell_chars: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_bytes: 52_428_800,
            max_rows: 100_000,
            max_cell_chars: 10_000,
        }
    }
}

/// Non-fatal findings reported alongside validated rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    DuplicateRowsDropped(usize),
    UnknownColumnsIgnored(Vec<String>),
    UnparsableDates(usize),
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRowsDropped(n) => write!(f, "{n} duplicate row(s) dropped"),
            Self::UnknownColumnsIgnored(cols) => {
                write!(f, "unknown column(s) ignored: {}", cols.join(", "))
            }
            Self::UnparsableDates(n) => write!(f, "{n} row(s) with unparsable dates"),
        }
    }
}

/// Source of CSV content for validation.
pub enum CsvInput<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

/// Recognized columns after alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    VideoId,
    Title,
    PublishedAt,
    Views,
    Impressions,
    Ctr,
    AvgViewDuration,
    Country,
    Likes,
    Comments,
}

fn resolve_column(name: &str) -> Option<Column> {
    match name.trim().to_ascii_lowercase().as_str() {
        "videoid" | "video_id" => Some(Column::VideoId),
        "videotitle" | "video_title" | "title" => Some(Column::Title),
        "date" | "published_at" | "publishedat" | "publish_date" => Some(Column::PublishedAt),
        "views" | "viewcount" | "view_count" => Some(Column::Views),
        "impressions" => Some(Column::Impressions),
        "ctr" => Some(Column::Ctr),
        "averageviewduration" | "avg_view_duration" | "avg_view_duration_s" => {
            Some(Column::AvgViewDuration)
        }
        "country" => Some(Column::Country),
        "likes" => Some(Column::Likes),
        "comments" => Some(Column::Comments),
        _ => None,
    }
}

/// Validates a CSV from either a path or in-memory bytes.
pub async fn validate_csv(
    input: CsvInput<'_>,
    limits: &IngestLimits,
) -> IngestResult<(Vec<CreatorRow>, Vec<ValidationWarning>)> {
    match input {
        CsvInput::Path(path) => validate_csv_path(path, limits).await,
        CsvInput::Bytes(bytes) => validate_csv_bytes(bytes, limits),
    }
}

/// Validates a CSV file on disk. The size limit is checked against file
/// metadata before the content is read.
pub async fn validate_csv_path(
    path: &Path,
    limits: &IngestLimits,
) -> IngestResult<(Vec<CreatorRow>, Vec<ValidationWarning>)> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| IngestError::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    if meta.len() > limits.max_bytes {
        return Err(IngestError::TooLarge(format!(
            "{} is {} bytes (limit {})",
            path.display(),
            meta.len(),
            limits.max_bytes
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    validate_csv_bytes(&bytes, limits)
}

/// Validates in-memory CSV content.
pub fn validate_csv_bytes(
    bytes: &[u8],
    limits: &IngestLimits,
) -> IngestResult<(Vec<CreatorRow>, Vec<ValidationWarning>)> {
    if bytes.len() as u64 > limits.max_bytes {
        return Err(IngestError::TooLarge(format!(
            "{} bytes (limit {})",
            bytes.len(),
            limits.max_bytes
        )));
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestError::InvalidInput(format!("not valid UTF-8: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::InvalidInput("CSV has no header row".into()));
    }

    let mut columns: Vec<Option<Column>> = Vec::with_capacity(headers.len());
    let mut unknown_columns = Vec::new();
    for header in headers.iter() {
        scan_cell(header, limits.max_cell_chars)?;
        let resolved = resolve_column(header);
        if resolved.is_none() && !header.trim().is_empty() {
            unknown_columns.push(header.trim().to_string());
        }
        columns.push(resolved);
    }

    if !columns.contains(&Some(Column::Title)) {
        return Err(IngestError::InvalidInput(
            "no title column found (expected one of videoTitle, video_title, title)".into(),
        ));
    }

    let mut rows = Vec::new();
    let mut bad_dates = 0usize;
    let mut duplicates = 0usize;
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut record_count = 0usize;

    for record in reader.records() {
        let record = record?;
        record_count += 1;
        if record_count > limits.max_rows {
            return Err(IngestError::TooLarge(format!(
                "more than {} data rows",
                limits.max_rows
            )));
        }

        // Security scan runs on raw cells before any coercion.
        for cell in record.iter() {
            scan_cell(cell, limits.max_cell_chars)?;
        }

        let mut row = CreatorRow::new(String::new());
        for (idx, column) in columns.iter().enumerate() {
            let Some(column) = column else { continue };
            let raw = record.get(idx).unwrap_or("").trim();
            if raw.is_empty() {
                continue;
            }
            match column {
                Column::VideoId => row.video_id = Some(raw.to_string()),
                Column::Title => row.title = truncate_chars(raw, 500),
                Column::PublishedAt => match parse_date(raw) {
                    Some(date) => row.published_at = Some(date),
                    None => bad_dates += 1,
                },
                Column::Views => row.views = parse_count(raw),
                Column::Impressions => row.impressions = parse_count(raw),
                Column::Likes => row.likes = parse_count(raw),
                Column::Comments => row.comments = parse_count(raw),
                Column::Ctr => row.ctr = parse_ctr(raw),
                Column::AvgViewDuration => {
                    row.avg_view_duration_s = raw.parse::<f64>().ok().filter(|v| *v >= 0.0)
                }
                Column::Country => row.country = Some(raw.to_string()),
            }
        }

        if row.title.is_empty() {
            continue;
        }

        let key = row
            .video_id
            .clone()
            .unwrap_or_else(|| format!("title:{}", row.title));
        if seen_keys.insert(key) {
            rows.push(row);
        } else {
            duplicates += 1;
        }
    }

    if rows.is_empty() {
        return Err(IngestError::InvalidInput(
            "no rows with a usable title".into(),
        ));
    }

    let mut warnings = Vec::new();
    if duplicates > 0 {
        warnings.push(ValidationWarning::DuplicateRowsDropped(duplicates));
    }
    if !unknown_columns.is_empty() {
        warnings.push(ValidationWarning::UnknownColumnsIgnored(unknown_columns));
    }
    if bad_dates > 0 {
        warnings.push(ValidationWarning::UnparsableDates(bad_dates));
    }

    debug!(
        rows = rows.len(),
        warnings = warnings.len(),
        "validated CSV input"
    );
    Ok((rows, warnings))
}

fn truncate_chars(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        input.to_string()
    } else {
        input.chars().take(max).collect()
    }
}

/// Integer counts tolerate thousands separators; anything else that fails
/// to parse becomes absent.
fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<u64>().ok()
}

/// Analytics exports report CTR either as a 0..1 fraction or as a
/// percentage; both are accepted, anything else becomes absent.
fn parse_ctr(raw: &str) -> Option<f64> {
    let raw = raw.trim_end_matches('%');
    let value = raw.trim().parse::<f64>().ok()?;
    if (0.0..=1.0).contains(&value) {
        Some(value)
    } else if (1.0..=100.0).contains(&value) {
        Some(value / 100.0)
    } else {
        None
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}
