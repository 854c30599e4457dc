//! Append-only strategy persistence.
//!
//! One pretty-printed JSON file per strategy plus a side index of
//! summaries. Every write goes through a temp-file-then-rename cycle so a
//! reader opening any indexed path always sees a complete record.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::StrategyStore;
