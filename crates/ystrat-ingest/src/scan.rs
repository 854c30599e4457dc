//! Per-cell security scan.
//!
//! Every raw cell is checked before any coercion. A single match rejects
//! the whole file; the error names the rule that fired so rejections can
//! be reported precisely.

use crate::error::{IngestError, IngestResult};

/// Markup fragments that must never appear inside a cell.
const HTML_MARKERS: &[&str] = &["<script", "<iframe", "<object", "<embed"];

/// URL protocols that must never appear inside a cell.
const URL_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Checks a raw cell against the security policy.
///
/// Leading `=`, `+` or `@` always fire the formula rule. A leading `-`
/// fires only when followed by a letter, so negative numbers like `-500`
/// stay legal.
pub fn scan_cell(cell: &str, max_cell_chars: usize) -> IngestResult<()> {
    if cell.chars().count() > max_cell_chars {
        return Err(IngestError::hostile(
            "cell-length",
            format!(
                "cell of {} characters exceeds the {} character limit",
                cell.chars().count(),
                max_cell_chars
            ),
        ));
    }

    let trimmed = cell.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('=') | Some('+') | Some('@') => {
            return Err(IngestError::hostile(
                "formula-injection",
                format!("cell starts with a spreadsheet formula marker: {}", preview(trimmed)),
            ));
        }
        Some('-') => {
            if chars.next().is_some_and(|c| c.is_alphabetic()) {
                return Err(IngestError::hostile(
                    "formula-injection",
                    format!("cell starts with '-' followed by a letter: {}", preview(trimmed)),
                ));
            }
        }
        _ => {}
    }

    let lower = cell.to_lowercase();
    for marker in HTML_MARKERS {
        if lower.contains(marker) {
            return Err(IngestError::hostile(
                "embedded-markup",
                format!("cell contains '{marker}'"),
            ));
        }
    }
    for protocol in URL_PROTOCOLS {
        if lower.contains(protocol) {
            return Err(IngestError::hostile(
                "url-protocol",
                format!("cell contains '{protocol}'"),
            ));
        }
    }

    Ok(())
}

fn preview(cell: &str) -> String {
    let shortened: String = cell.chars().take(40).collect();
    if shortened.len() < cell.len() {
        format!("'{shortened}…'")
    } else {
        format!("'{shortened}'")
    }
}
