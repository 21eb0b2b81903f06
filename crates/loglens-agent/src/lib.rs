//! Question-answering agent for tabular log data.
//!
//! Translates natural-language questions into structured query plans,
//! executes them against a loaded [`loglens_data::Table`], and may plot a
//! bar chart onto an explicit [`ChartSurface`] as a side output of the
//! answer. The [`TabularAgent`] trait is the boundary the conversation
//! controller sees; [`AgentFactory`] builds the concrete agent for a
//! dataset.

pub mod agent;
pub mod error;
pub mod parser;
pub mod render;
pub mod surface;

pub use agent::{AgentFactory, TableAgent, TabularAgent};
pub use error::AgentError;
pub use parser::{QueryParser, QueryPlan};
pub use surface::{Bar, ChartSurface, Figure};
