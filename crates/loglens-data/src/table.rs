//! In-memory table loaded from an uploaded CSV file.
//!
//! All cells are kept as strings; numeric interpretation happens lazily in
//! [`Table::numeric_summary`]. Every row is guaranteed to have exactly one
//! cell per column.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::DatasetError;

/// A rows-by-named-columns dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// The first few rows of a table, for rendering a dataset preview.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Min/max/mean of a fully numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Table {
    /// Build a table directly from columns and rows.
    ///
    /// Every row must have exactly one cell per column. Unlike the CSV
    /// loaders, an empty table is allowed here; the agent factory refuses to
    /// bind to one.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        if rows.iter().any(|row| row.len() != columns.len()) {
            return Err(DatasetError::Parse(
                "row width does not match header".to_string(),
            ));
        }
        Ok(Self { columns, rows })
    }

    /// Read a table from CSV text.
    pub fn from_csv_str(content: &str) -> Result<Self, DatasetError> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// Read a table from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Read a table from any CSV byte source.
    ///
    /// The first record is taken as the header row. Ragged rows are a parse
    /// error; a missing header or zero data rows is [`DatasetError::Empty`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(DatasetError::Empty);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        debug!(rows = rows.len(), columns = columns.len(), "CSV loaded");
        Ok(Self { columns, rows })
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column header names, in file order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Find a column by name (case-insensitive, surrounding whitespace
    /// ignored).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.columns
            .iter()
            .position(|c| c.trim().to_lowercase() == wanted)
    }

    /// Iterate the cells of one column.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    /// The first `n` rows, for the dataset preview panel.
    pub fn head(&self, n: usize) -> Preview {
        Preview {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Occurrences of each distinct value in a column, most frequent first.
    ///
    /// Ties are broken by label so the ordering is deterministic.
    pub fn value_counts(&self, idx: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for cell in self.column(idx) {
            *counts.entry(cell).or_insert(0) += 1;
        }
        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Rows where any cell contains `term` (case-insensitive substring).
    pub fn count_matching(&self, term: &str) -> usize {
        let needle = term.to_lowercase();
        self.rows
            .iter()
            .filter(|row| row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
            .count()
    }

    /// Rows whose cell in one column contains `term` (case-insensitive).
    pub fn count_in_column(&self, idx: usize, term: &str) -> usize {
        let needle = term.to_lowercase();
        self.column(idx)
            .filter(|cell| cell.to_lowercase().contains(&needle))
            .count()
    }

    /// Number of distinct values in a column.
    pub fn distinct_count(&self, idx: usize) -> usize {
        self.column(idx).collect::<BTreeSet<_>>().len()
    }

    /// Min/max/mean of a column, when every non-empty cell parses as f64.
    ///
    /// Returns `None` for non-numeric columns and for columns with no
    /// non-empty cells.
    pub fn numeric_summary(&self, idx: usize) -> Option<NumericSummary> {
        let mut values = Vec::new();
        for cell in self.column(idx) {
            if cell.is_empty() {
                continue;
            }
            values.push(cell.parse::<f64>().ok()?);
        }
        if values.is_empty() {
            return None;
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(NumericSummary { min, max, mean })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAFFIC_CSV: &str = "\
status,method,user_agent
200,GET,Mozilla/5.0
404,GET,Googlebot/2.1
200,POST,Mozilla/5.0
500,GET,bingbot/3.0
200,GET,curl/8.0
";

    fn traffic() -> Table {
        Table::from_csv_str(TRAFFIC_CSV).unwrap()
    }

    // ---- Construction ----

    #[test]
    fn test_new_validates_row_width() {
        let ok = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert!(ok.is_ok());

        let ragged = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        );
        assert!(matches!(ragged, Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_new_allows_empty_table() {
        let t = Table::new(vec![], vec![]).unwrap();
        assert_eq!(t.n_rows(), 0);
        assert_eq!(t.n_cols(), 0);
    }

    // ---- Loading ----

    #[test]
    fn test_from_csv_str_shape() {
        let t = traffic();
        assert_eq!(t.n_rows(), 5);
        assert_eq!(t.n_cols(), 3);
        assert_eq!(t.column_names(), &["status", "method", "user_agent"]);
    }

    #[test]
    fn test_from_csv_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traffic.csv");
        std::fs::write(&path, TRAFFIC_CSV).unwrap();

        let t = Table::from_csv_path(&path).unwrap();
        assert_eq!(t.n_rows(), 5);
    }

    #[test]
    fn test_from_csv_path_missing_file() {
        let result = Table::from_csv_path(Path::new("/nonexistent/traffic.csv"));
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(Table::from_csv_str(""), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_header_only_rejected() {
        let result = Table::from_csv_str("status,method\n");
        assert!(matches!(result, Err(DatasetError::Empty)));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = Table::from_csv_str("a,b\n1,2\n3\n");
        assert!(matches!(result, Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_cells_are_trimmed() {
        let t = Table::from_csv_str("a, b\n 1 , x \n").unwrap();
        assert_eq!(t.column_names(), &["a", "b"]);
        assert_eq!(t.head(1).rows[0], vec!["1", "x"]);
    }

    // ---- Column lookup ----

    #[test]
    fn test_column_index_case_insensitive() {
        let t = traffic();
        assert_eq!(t.column_index("Status"), Some(0));
        assert_eq!(t.column_index("METHOD"), Some(1));
        assert_eq!(t.column_index(" user_agent "), Some(2));
        assert_eq!(t.column_index("missing"), None);
    }

    // ---- Preview ----

    #[test]
    fn test_head_limits_rows() {
        let t = traffic();
        let preview = t.head(2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.columns, t.column_names());
        assert_eq!(preview.rows[0], vec!["200", "GET", "Mozilla/5.0"]);
    }

    #[test]
    fn test_head_larger_than_table() {
        let t = traffic();
        assert_eq!(t.head(100).rows.len(), 5);
    }

    // ---- Aggregations ----

    #[test]
    fn test_value_counts_sorted_desc() {
        let t = traffic();
        let counts = t.value_counts(0);
        assert_eq!(
            counts,
            vec![
                ("200".to_string(), 3),
                ("404".to_string(), 1),
                ("500".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_value_counts_tie_broken_by_label() {
        let t = Table::from_csv_str("x\nb\na\nb\na\n").unwrap();
        let counts = t.value_counts(0);
        assert_eq!(
            counts,
            vec![("a".to_string(), 2), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn test_count_matching_any_cell() {
        let t = traffic();
        assert_eq!(t.count_matching("bot"), 2); // Googlebot + bingbot
        assert_eq!(t.count_matching("GET"), 4);
        assert_eq!(t.count_matching("get"), 4); // case-insensitive
        assert_eq!(t.count_matching("teapot"), 0);
    }

    #[test]
    fn test_count_in_column() {
        let t = traffic();
        assert_eq!(t.count_in_column(1, "get"), 4);
        assert_eq!(t.count_in_column(0, "get"), 0);
    }

    #[test]
    fn test_distinct_count() {
        let t = traffic();
        assert_eq!(t.distinct_count(0), 3);
        assert_eq!(t.distinct_count(1), 2);
        assert_eq!(t.distinct_count(2), 5);
    }

    // ---- Numeric summary ----

    #[test]
    fn test_numeric_summary_numeric_column() {
        let t = traffic();
        let summary = t.numeric_summary(0).unwrap();
        assert_eq!(summary.min, 200.0);
        assert_eq!(summary.max, 500.0);
        assert!((summary.mean - 300.8).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_summary_text_column() {
        let t = traffic();
        assert!(t.numeric_summary(1).is_none());
    }

    #[test]
    fn test_numeric_summary_skips_empty_cells() {
        let t = Table::from_csv_str("n\n1\n\n3\n").unwrap();
        let summary = t.numeric_summary(0).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.mean, 2.0);
    }

    #[test]
    fn test_numeric_summary_all_empty_cells() {
        let t = Table::from_csv_str("n,x\n,a\n,b\n").unwrap();
        assert!(t.numeric_summary(0).is_none());
    }
}
