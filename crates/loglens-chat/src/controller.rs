//! Conversation controller: executes one question-answer turn.
//!
//! Both entry points (a pre-written example question selected in the UI,
//! and free-text input) route through [`ConversationController::submit`], so
//! history appends, chart capture, and error formatting behave identically
//! regardless of how the question arrived.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};
use uuid::Uuid;

use loglens_agent::ChartSurface;
use loglens_core::config::{ChartConfig, ChatConfig};
use loglens_core::types::Message;

use crate::error::ChatError;
use crate::session::SessionStore;

/// The two messages appended by one completed turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session_id: Uuid,
    /// `[user, assistant]`, in append order.
    pub messages: [Message; 2],
}

/// Orchestrates turns against the session store and the shared chart
/// surface.
pub struct ConversationController {
    store: Arc<SessionStore>,
    surface: Arc<Mutex<ChartSurface>>,
    chat: ChatConfig,
    chart: ChartConfig,
}

impl ConversationController {
    pub fn new(
        store: Arc<SessionStore>,
        surface: Arc<Mutex<ChartSurface>>,
        chat: ChatConfig,
        chart: ChartConfig,
    ) -> Self {
        Self {
            store,
            surface,
            chat,
            chart,
        }
    }

    /// The configured example questions, in display order.
    pub fn example_questions(&self) -> &[String] {
        &self.chat.example_questions
    }

    /// Execute one question-answer turn.
    ///
    /// Appends a user message and an assistant message to the session's
    /// history. An agent failure is folded into the assistant message
    /// ("Error analyzing query: ...") and the turn still completes; only
    /// precondition violations (no dataset, validation, unknown session)
    /// return an error, and those append nothing.
    ///
    /// The shared chart surface is probed after the agent call and reset
    /// unconditionally, so a partial drawing can never leak into the next
    /// turn.
    pub fn submit(&self, session_id: Uuid, question: &str) -> Result<Turn, ChatError> {
        if question.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if question.len() > self.chat.max_message_length {
            return Err(ChatError::MessageTooLong(self.chat.max_message_length));
        }

        self.store.with_session_mut(session_id, |session| {
            let Some(agent) = session.agent.as_ref() else {
                return Err(ChatError::DatasetMissing);
            };
            if session.dataset.is_none() {
                return Err(ChatError::DatasetMissing);
            }

            session.history.push(Message::user(question));

            let assistant = {
                let mut surface = self.lock_surface()?;
                // The agent may block for an unbounded time; the held locks
                // are what serialize turns process-wide.
                let message = match agent.answer(question, &mut surface) {
                    Ok(text) => match surface.take_png(&self.chart) {
                        Some(png) => Message::assistant_with_chart(text, png),
                        None => Message::assistant(text),
                    },
                    Err(e) => {
                        warn!(session = %session_id, error = %e, "Query failed; folding into transcript");
                        Message::assistant(format!("Error analyzing query: {}", e))
                    }
                };
                // Mandatory reset, chart or no chart, success or failure.
                surface.clear();
                message
            };

            session.history.push(assistant.clone());
            session.last_active_at = chrono::Utc::now();

            let user = session.history[session.history.len() - 2].clone();
            info!(
                session = %session_id,
                history_len = session.history.len(),
                chart = assistant.has_chart(),
                "Turn completed"
            );
            Ok(Turn {
                session_id,
                messages: [user, assistant],
            })
        })?
    }

    /// Submit one of the configured example questions by index.
    ///
    /// The question flows through the pending-question slot and then the
    /// same submit path as free text.
    pub fn submit_example(&self, session_id: Uuid, index: usize) -> Result<Turn, ChatError> {
        let question = self
            .chat
            .example_questions
            .get(index)
            .cloned()
            .ok_or(ChatError::UnknownExample(index))?;
        self.store.set_pending_question(session_id, question)?;
        match self.process_pending(session_id)? {
            Some(turn) => Ok(turn),
            None => Err(ChatError::Store(
                "pending question vanished before processing".to_string(),
            )),
        }
    }

    /// Consume the pending question, if any, and run it through `submit`.
    ///
    /// The pending slot is cleared before the turn runs, so it is always
    /// empty once this returns, including when the turn itself fails.
    pub fn process_pending(&self, session_id: Uuid) -> Result<Option<Turn>, ChatError> {
        let Some(question) = self.store.take_pending_question(session_id)? else {
            return Ok(None);
        };
        self.submit(session_id, &question).map(Some)
    }

    fn lock_surface(&self) -> Result<MutexGuard<'_, ChartSurface>, ChatError> {
        self.surface
            .lock()
            .map_err(|e| ChatError::Store(format!("chart surface lock poisoned: {}", e)))
    }
}
