//! Tabular dataset support for Loglens.
//!
//! Loads uploaded CSV log files into an in-memory [`Table`] and provides the
//! column operations the question-answering agent executes against: value
//! counts, substring matching, distinct counts, and numeric summaries.

pub mod error;
pub mod table;

pub use error::DatasetError;
pub use table::{NumericSummary, Preview, Table};
