//! Error types for dataset loading.

use loglens_core::error::LoglensError;

/// Errors from reading an uploaded file into a [`crate::Table`].
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("file is not parsable as CSV: {0}")]
    Parse(String),
    #[error("file contains no tabular data")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Parse(err.to_string())
    }
}

impl From<DatasetError> for LoglensError {
    fn from(err: DatasetError) -> Self {
        LoglensError::Dataset(err.to_string())
    }
}
