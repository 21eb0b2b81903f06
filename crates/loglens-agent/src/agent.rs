//! The tabular question-answering agent and its factory.
//!
//! [`TabularAgent`] is the single capability the conversation controller
//! depends on: answer a question, possibly plotting onto the provided
//! surface. [`TableAgent`] is the concrete implementation bound to one
//! loaded table; [`AgentFactory`] builds it and is the place construction
//! can fail without touching caller state.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, info};

use loglens_core::config::{AgentConfig, ParseErrorMode};
use loglens_data::Table;

use crate::error::AgentError;
use crate::parser::{QueryParser, QueryPlan};
use crate::surface::{Bar, ChartSurface, Figure};

/// A question-answering agent bound to a loaded dataset.
///
/// `answer` is synchronous and may take an unbounded amount of time; callers
/// impose no timeout. A chart drawn onto `surface` is a side output of the
/// call: the caller probes the surface afterwards and resets it.
pub trait TabularAgent: Send + Sync {
    fn answer(&self, question: &str, surface: &mut ChartSurface) -> Result<String, AgentError>;
}

/// Builds agents for freshly loaded datasets.
pub struct AgentFactory;

impl AgentFactory {
    /// Build an agent bound to `table`.
    ///
    /// Fails with [`AgentError::EmptyTable`] when the table has no columns
    /// or no rows. On failure the caller's previous dataset/agent state must
    /// remain untouched; this function takes no state to corrupt.
    pub fn build(
        table: Arc<Table>,
        config: &AgentConfig,
    ) -> Result<Box<dyn TabularAgent>, AgentError> {
        if table.n_cols() == 0 || table.n_rows() == 0 {
            return Err(AgentError::EmptyTable);
        }
        info!(
            rows = table.n_rows(),
            columns = table.n_cols(),
            "Agent bound to dataset"
        );
        Ok(Box::new(TableAgent::new(table, config.clone())))
    }
}

/// Deterministic agent executing parsed query plans against a [`Table`].
pub struct TableAgent {
    table: Arc<Table>,
    parser: QueryParser,
    config: AgentConfig,
}

impl TableAgent {
    pub fn new(table: Arc<Table>, config: AgentConfig) -> Self {
        let parser = QueryParser::new(table.column_names());
        Self {
            table,
            parser,
            config,
        }
    }

    fn execute(
        &self,
        question: &str,
        plan: QueryPlan,
        surface: &mut ChartSurface,
    ) -> Result<String, AgentError> {
        match plan {
            QueryPlan::CountPlot { column } => self.count_plot(&column, surface),
            QueryPlan::ValueCounts { column } => self.value_counts(&column),
            QueryPlan::DistinctCount { column } => self.distinct_count(&column),
            QueryPlan::CountMatching { term } => Ok(self.count_matching(&term)),
            QueryPlan::CountRows => Ok(format!(
                "The dataset has {} rows and {} columns.",
                self.table.n_rows(),
                self.table.n_cols()
            )),
            QueryPlan::Summary => Ok(self.summary()),
            QueryPlan::Unknown => match self.config.on_parse_error {
                ParseErrorMode::Clarify => Ok(clarification(&self.table)),
                ParseErrorMode::Fail => {
                    Err(AgentError::UnsupportedQuestion(question.to_string()))
                }
            },
        }
    }

    fn column_index(&self, column: &str) -> Result<usize, AgentError> {
        self.table
            .column_index(column)
            .ok_or_else(|| AgentError::UnknownColumn(column.to_string()))
    }

    fn count_plot(&self, column: &str, surface: &mut ChartSurface) -> Result<String, AgentError> {
        let idx = self.column_index(column)?;
        let counts = self.table.value_counts(idx);
        let total = counts.len();
        let shown: Vec<(String, usize)> = counts
            .into_iter()
            .take(self.config.max_chart_categories)
            .collect();

        let bars = shown
            .iter()
            .map(|(label, value)| Bar {
                label: label.clone(),
                value: *value,
            })
            .collect();
        surface.draw(Figure {
            title: format!("Count of values in '{}'", column),
            x_label: column.to_string(),
            bars,
        });

        let mut answer = if shown.len() < total {
            format!(
                "Plotted the {} most frequent of {} values in '{}' across {} rows.",
                shown.len(),
                total,
                column,
                self.table.n_rows()
            )
        } else {
            format!(
                "Plotted the count of values in '{}' ({} categories across {} rows).",
                column,
                total,
                self.table.n_rows()
            )
        };
        answer.push_str(" Bars, left to right: ");
        answer.push_str(&ranked_list(&shown));
        answer.push('.');
        Ok(answer)
    }

    fn value_counts(&self, column: &str) -> Result<String, AgentError> {
        let idx = self.column_index(column)?;
        let counts = self.table.value_counts(idx);
        let total = counts.len();
        let shown: Vec<(String, usize)> = counts
            .into_iter()
            .take(self.config.max_chart_categories)
            .collect();

        let mut answer = format!("Value counts for '{}': {}", column, ranked_list(&shown));
        if shown.len() < total {
            let _ = write!(answer, " and {} more", total - shown.len());
        }
        answer.push('.');
        Ok(answer)
    }

    fn distinct_count(&self, column: &str) -> Result<String, AgentError> {
        let idx = self.column_index(column)?;
        Ok(format!(
            "Column '{}' has {} distinct values across {} rows.",
            column,
            self.table.distinct_count(idx),
            self.table.n_rows()
        ))
    }

    fn count_matching(&self, term: &str) -> String {
        let count = self.table.count_matching(term);
        format!(
            "Found {} of {} rows matching '{}'.",
            count,
            self.table.n_rows(),
            term
        )
    }

    fn summary(&self) -> String {
        let mut out = format!(
            "The dataset has {} rows and {} columns.",
            self.table.n_rows(),
            self.table.n_cols()
        );
        for (idx, name) in self.table.column_names().iter().enumerate() {
            let distinct = self.table.distinct_count(idx);
            let _ = write!(out, "\n- {}: {} distinct values", name, distinct);
            if let Some(stats) = self.table.numeric_summary(idx) {
                let _ = write!(
                    out,
                    "; numeric, min {}, max {}, mean {:.2}",
                    stats.min, stats.max, stats.mean
                );
            } else if let Some((top, count)) = self.table.value_counts(idx).into_iter().next() {
                let _ = write!(out, "; most frequent '{}' ({})", top, count);
            }
        }
        out
    }
}

impl TabularAgent for TableAgent {
    fn answer(&self, question: &str, surface: &mut ChartSurface) -> Result<String, AgentError> {
        let plan = self.parser.parse(question);
        if self.config.verbose {
            info!(?plan, question, "Executing query plan");
        } else {
            debug!(?plan, question, "Executing query plan");
        }

        let result = self.execute(question, plan, surface);
        match &result {
            Ok(answer) => {
                if self.config.verbose {
                    info!(answer_len = answer.len(), chart = surface.has_figure(), "Answer ready");
                } else {
                    debug!(answer_len = answer.len(), chart = surface.has_figure(), "Answer ready");
                }
            }
            Err(e) => debug!(error = %e, "Query failed"),
        }
        result
    }
}

/// Format "label (count)" pairs in rank order.
fn ranked_list(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(label, count)| format!("{} ({})", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Answer returned for unparseable questions in Clarify mode.
fn clarification(table: &Table) -> String {
    format!(
        "I could not map that question to the loaded table. Try a count (\"how many ...\"), \
         a breakdown (\"counts by <column>\"), a plot (\"plot the <column> column\"), or a \
         summary (\"analyze the data\"). Available columns: {}.",
        table.column_names().join(", ")
    )
}
