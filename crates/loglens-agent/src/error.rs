//! Error types for agent construction and query execution.

use loglens_core::error::LoglensError;

/// Errors from the tabular question-answering agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("the loaded table has no usable rows or columns")]
    EmptyTable,
    #[error("no column named '{0}' in the loaded data")]
    UnknownColumn(String),
    #[error("unable to translate the question into a table query: {0}")]
    UnsupportedQuestion(String),
    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl From<AgentError> for LoglensError {
    fn from(err: AgentError) -> Self {
        LoglensError::Agent(err.to_string())
    }
}
