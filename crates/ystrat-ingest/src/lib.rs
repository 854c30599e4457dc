//! Tabular input validation and input sanitization.
//!
//! This crate owns everything that touches untrusted input before it
//! reaches the rest of the pipeline:
//! - CSV parsing with size/row limits and column aliasing
//! - The per-cell security scan (formula injection, embedded markup,
//!   dangerous URL protocols, oversized cells)
//! - The free-text sanitizer shared by prompt assembly and the LLM client

pub mod csv_input;
pub mod error;
pub mod sanitize;
pub mod scan;

pub use csv_input::{validate_csv, validate_csv_bytes, validate_csv_path, CsvInput, IngestLimits, ValidationWarning};
pub use error::{IngestError, IngestResult};
pub use sanitize::sanitize_text;
pub use scan::scan_cell;
