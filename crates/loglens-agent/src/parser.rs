//! Natural-language question parser.
//!
//! Classifies a question into a [`QueryPlan`] the agent can execute against
//! the loaded table: plots, per-column breakdowns, row-matching counts,
//! distinct counts, and whole-table summaries. The parser is schema-aware:
//! column references are resolved either from an explicit "... the <name>
//! column" phrase or by matching a known column name anywhere in the
//! question.

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

static PLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(plot|chart|graph|histogram)\b").unwrap());

static DISTINCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(unique|distinct|different)\b").unwrap());

static BREAKDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(breakdown|distribution|frequenc(?:y|ies)|counts?\s+(?:per|by|of|for))\b")
        .unwrap()
});

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(how\s+many|total\s+number|number\s+of|count)\b").unwrap()
});

static COUNT_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:how\s+many|total\s+number(?:\s+of)?|number\s+of|count(?:\s+of)?)\s+(.+)$",
    )
    .unwrap()
});

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(analy[sz]e|analysis|summar\w*|overview|describe|patterns?)\b").unwrap()
});

// Explicit column reference: "... for the status column"
static COLUMN_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:for|of|by|per|in|on)\s+(?:the\s+)?([A-Za-z0-9_]+)\s+columns?\b")
        .unwrap()
});

// Words that name the data as a whole rather than something to match on.
static GENERIC_WORDS: &[&str] = &[
    "the", "a", "an", "of", "in", "all", "total", "there", "are", "is", "we", "do", "have",
    "data", "dataset", "table", "log", "logs", "file", "row", "rows", "entry", "entries",
    "record", "records", "line", "lines", "request", "requests", "hit", "hits", "event",
    "events", "values",
];

// =============================================================================
// Query plan
// =============================================================================

/// A structured query the agent can execute against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Draw a bar chart of value counts for one column.
    CountPlot { column: String },
    /// Textual value-count breakdown for one column.
    ValueCounts { column: String },
    /// Number of distinct values in one column.
    DistinctCount { column: String },
    /// Number of rows with any cell matching a term.
    CountMatching { term: String },
    /// Total row/column count.
    CountRows,
    /// Whole-table summary.
    Summary,
    /// The question could not be mapped to the table.
    Unknown,
}

// =============================================================================
// Parser
// =============================================================================

/// Schema-aware question parser.
pub struct QueryParser {
    columns: Vec<String>,
}

impl QueryParser {
    /// Create a parser for a table with the given column names.
    pub fn new(columns: &[String]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.trim().to_lowercase()).collect(),
        }
    }

    /// Classify a question into a [`QueryPlan`].
    pub fn parse(&self, question: &str) -> QueryPlan {
        let column = self.resolve_column(question);

        if PLOT_RE.is_match(question) {
            return match column {
                Some(column) => QueryPlan::CountPlot { column },
                None => QueryPlan::Unknown,
            };
        }

        if DISTINCT_RE.is_match(question) {
            if let Some(column) = column {
                return QueryPlan::DistinctCount { column };
            }
        }

        if BREAKDOWN_RE.is_match(question) {
            if let Some(column) = column {
                return QueryPlan::ValueCounts { column };
            }
        }

        if COUNT_RE.is_match(question) {
            return match extract_term(question) {
                Some(term) => QueryPlan::CountMatching { term },
                None => QueryPlan::CountRows,
            };
        }

        if SUMMARY_RE.is_match(question) {
            return QueryPlan::Summary;
        }

        QueryPlan::Unknown
    }

    /// Resolve the column a question refers to, if any.
    ///
    /// An explicit "... the <name> column" phrase wins; otherwise any token
    /// equal to a known column name (allowing a plural "s") matches.
    fn resolve_column(&self, question: &str) -> Option<String> {
        if let Some(caps) = COLUMN_REF_RE.captures(question) {
            return Some(caps[1].to_lowercase());
        }

        for token in tokens(question) {
            let token = token.to_lowercase();
            for col in &self.columns {
                if token == *col || token.strip_suffix('s') == Some(col.as_str()) {
                    return Some(col.clone());
                }
            }
        }
        None
    }
}

/// Extract the term a counting question asks to match rows against.
///
/// Returns `None` when the question counts the table itself ("how many
/// rows"), which callers treat as [`QueryPlan::CountRows`].
fn extract_term(question: &str) -> Option<String> {
    let caps = COUNT_TAIL_RE.captures(question)?;
    let tail = caps[1]
        .trim_end_matches(['?', '.', '!'])
        .trim()
        .to_lowercase();

    let mut words = tokens(&tail)
        .into_iter()
        .filter(|w| !GENERIC_WORDS.contains(&w.as_str()));

    let term = words.next()?;
    Some(singular(&term))
}

/// Trim a plural "s", keeping short words and "ss" endings intact.
fn singular(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
