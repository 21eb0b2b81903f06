//! Application state shared across all route handlers.
//!
//! AppState wires the session store, the shared chart surface, and the
//! conversation controller together and is passed to handlers via axum's
//! State extractor.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use loglens_agent::ChartSurface;
use loglens_chat::{ConversationController, SessionStore};
use loglens_core::LoglensConfig;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks; the chart
/// surface sits behind a `Mutex` inside the controller.
#[derive(Clone)]
pub struct AppState {
    /// Per-session conversational state.
    pub store: Arc<SessionStore>,
    /// Turn execution (submit, example questions, chart capture).
    pub controller: Arc<ConversationController>,
    /// Application configuration.
    pub config: Arc<LoglensConfig>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState from a configuration.
    pub fn new(config: LoglensConfig) -> Self {
        let store = Arc::new(SessionStore::new());
        let surface = Arc::new(Mutex::new(ChartSurface::new()));
        let controller = Arc::new(ConversationController::new(
            Arc::clone(&store),
            surface,
            config.chat.clone(),
            config.chart.clone(),
        ));
        Self {
            store,
            controller,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
