//! Conversational session management for Loglens.
//!
//! The [`SessionStore`] holds per-session state (transcript, loaded dataset,
//! bound agent, pending question) across otherwise-stateless request cycles;
//! the [`ConversationController`] executes one question-answer turn,
//! including chart capture and error folding. Button-selected example
//! questions and free-text input route through the same submit path.

pub mod controller;
pub mod error;
pub mod session;

pub use controller::{ConversationController, Turn};
pub use error::ChatError;
pub use session::{Session, SessionStore};
