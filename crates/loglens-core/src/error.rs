use thiserror::Error;

/// Top-level error type for the Loglens system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// LoglensError` so that the `?` operator works seamlessly across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoglensError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for LoglensError {
    fn from(err: toml::de::Error) -> Self {
        LoglensError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LoglensError {
    fn from(err: toml::ser::Error) -> Self {
        LoglensError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LoglensError {
    fn from(err: serde_json::Error) -> Self {
        LoglensError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Loglens operations.
pub type Result<T> = std::result::Result<T, LoglensError>;
