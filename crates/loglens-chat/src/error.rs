//! Error types for the conversational interface.

use loglens_agent::AgentError;
use loglens_core::error::LoglensError;

/// Errors from the session store and conversation controller.
///
/// Query execution failures never appear here: the controller folds them
/// into the transcript as an assistant message and the turn completes.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("no dataset loaded; upload a log file to start the analysis")]
    DatasetMissing,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("no example question at index {0}")]
    UnknownExample(usize),
    #[error("failed to build an agent for the dataset: {0}")]
    AgentConstruction(#[from] AgentError),
    #[error("session store error: {0}")]
    Store(String),
}

impl From<ChatError> for LoglensError {
    fn from(err: ChatError) -> Self {
        LoglensError::Chat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_chat_error_display() {
        let id = Uuid::new_v4();
        let err = ChatError::SessionNotFound(id);
        assert_eq!(err.to_string(), format!("session not found: {}", id));

        let err = ChatError::DatasetMissing;
        assert_eq!(
            err.to_string(),
            "no dataset loaded; upload a log file to start the analysis"
        );

        let err = ChatError::EmptyMessage;
        assert_eq!(err.to_string(), "message cannot be empty");

        let err = ChatError::MessageTooLong(2000);
        assert_eq!(
            err.to_string(),
            "message exceeds maximum length of 2000 characters"
        );

        let err = ChatError::UnknownExample(7);
        assert_eq!(err.to_string(), "no example question at index 7");

        let err = ChatError::Store("lock poisoned".to_string());
        assert_eq!(err.to_string(), "session store error: lock poisoned");
    }

    #[test]
    fn test_agent_construction_from_agent_error() {
        let err: ChatError = AgentError::EmptyTable.into();
        assert!(matches!(err, ChatError::AgentConstruction(_)));
        assert!(err.to_string().contains("no usable rows"));
    }

    #[test]
    fn test_chat_error_into_loglens_error() {
        let err: LoglensError = ChatError::DatasetMissing.into();
        assert!(matches!(err, LoglensError::Chat(_)));
    }
}
