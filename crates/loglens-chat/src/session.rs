//! Per-session state and the process-wide session store.
//!
//! Each user connection owns one [`Session`]. Sessions live in a
//! mutex-guarded map; the lock also serializes turns, which is what makes
//! the shared chart surface safe to reset without its own synchronization
//! discipline beyond a plain mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use loglens_agent::{AgentFactory, TabularAgent};
use loglens_core::config::AgentConfig;
use loglens_core::types::Message;
use loglens_data::{Preview, Table};

use crate::error::ChatError;

/// State for one user connection.
///
/// Invariants:
/// - `agent` is `Some` only when `dataset` is `Some`.
/// - `history` is append-only in conversation order; `reset_conversation`
///   is the only operation that drops messages.
/// - `pending_question` holds at most one outstanding value and is cleared
///   in the same logical step that consumes it.
pub struct Session {
    pub id: Uuid,
    pub history: Vec<Message>,
    pub dataset: Option<Arc<Table>>,
    pub agent: Option<Box<dyn TabularAgent>>,
    pub pending_question: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            history: Vec::new(),
            dataset: None,
            agent: None,
            pending_question: None,
            started_at: now,
            last_active_at: now,
        }
    }
}

/// Process-wide store of all live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a session.
    ///
    /// Idempotent: an existing session is returned untouched, so this is
    /// safe to call on every request cycle. A missing or absent ID creates
    /// a fresh session with empty history, no dataset, no agent, and no
    /// pending question.
    pub fn initialize(&self, id: Option<Uuid>) -> Result<Uuid, ChatError> {
        let mut sessions = self.lock()?;
        if let Some(id) = id {
            if sessions.contains_key(&id) {
                return Ok(id);
            }
        }
        let id = id.unwrap_or_else(Uuid::new_v4);
        sessions.insert(id, Session::new(id));
        info!(session = %id, "Session created");
        Ok(id)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether a session exists.
    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().map(|s| s.contains_key(&id)).unwrap_or(false)
    }

    /// Drop a session entirely.
    pub fn remove(&self, id: Uuid) -> Result<(), ChatError> {
        let mut sessions = self.lock()?;
        sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(ChatError::SessionNotFound(id))
    }

    /// Clear the transcript and any pending question.
    ///
    /// The loaded dataset and its agent are left untouched.
    pub fn reset_conversation(&self, id: Uuid) -> Result<(), ChatError> {
        self.with_session_mut(id, |session| {
            session.history.clear();
            session.pending_question = None;
        })
    }

    /// Replace the session's dataset, rebuilding the agent for it.
    ///
    /// The agent is built first; if construction fails the previous
    /// dataset/agent pair stays in place and the error is returned.
    pub fn load_dataset(
        &self,
        id: Uuid,
        table: Table,
        agent_config: &AgentConfig,
    ) -> Result<(), ChatError> {
        let table = Arc::new(table);
        let agent = AgentFactory::build(Arc::clone(&table), agent_config)?;
        self.with_session_mut(id, |session| {
            session.dataset = Some(table);
            session.agent = Some(agent);
            session.last_active_at = Utc::now();
            info!(
                session = %id,
                rows = session.dataset.as_ref().map(|t| t.n_rows()).unwrap_or(0),
                "Dataset loaded"
            );
        })
    }

    /// Store a question selected from the example list.
    ///
    /// At most one value is outstanding; a second call replaces the first.
    pub fn set_pending_question(&self, id: Uuid, question: String) -> Result<(), ChatError> {
        self.with_session_mut(id, |session| {
            session.pending_question = Some(question);
        })
    }

    /// Consume and clear the pending question, if any.
    pub fn take_pending_question(&self, id: Uuid) -> Result<Option<String>, ChatError> {
        self.with_session_mut(id, |session| session.pending_question.take())
    }

    /// Snapshot of the transcript.
    pub fn history(&self, id: Uuid) -> Result<Vec<Message>, ChatError> {
        self.with_session_mut(id, |session| session.history.clone())
    }

    /// Preview of the loaded dataset, if any.
    pub fn preview(&self, id: Uuid, rows: usize) -> Result<Option<Preview>, ChatError> {
        self.with_session_mut(id, |session| {
            session.dataset.as_ref().map(|table| table.head(rows))
        })
    }

    /// Whether the session has a dataset (and therefore an agent) bound.
    pub fn has_dataset(&self, id: Uuid) -> Result<bool, ChatError> {
        self.with_session_mut(id, |session| session.dataset.is_some())
    }

    /// Run a closure with mutable access to one session.
    pub(crate) fn with_session_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, ChatError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&id)
            .ok_or(ChatError::SessionNotFound(id))?;
        Ok(f(session))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Session>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Store(format!("session lock poisoned: {}", e)))
    }
}
