//! HTTP API for Loglens.
//!
//! Exposes the conversational core over a small JSON surface: dataset
//! upload, chat turns (free text and example questions), transcript access,
//! and an embedded single-page chat UI.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod ui;

pub use routes::{create_router, start_server};
pub use state::AppState;
