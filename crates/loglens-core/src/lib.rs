//! Shared foundation for the Loglens workspace.
//!
//! Defines the top-level error type, the TOML-backed configuration, and the
//! chat message types exchanged between the session store, the agent, and
//! the API layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::LoglensConfig;
pub use error::{LoglensError, Result};
pub use types::*;
