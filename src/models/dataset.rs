//! Dataset model
//!
//! Tabular data parsed from an uploaded CSV file. The first record is the
//! header; every later record becomes a row of [`Cell`]s. Columns are typed
//! after parsing: a column is numeric when it holds at least one value and
//! every non-missing value parses as a float.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Markers read as missing values
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Rows shown in a dataset preview
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV file is empty")]
    Empty,

    #[error("Malformed CSV: {0}")]
    Csv(String),
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Csv(err.to_string())
    }
}

/// A single parsed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if MISSING_MARKERS.contains(&value) {
            return Cell::Missing;
        }
        match value.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(value.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// In-memory table loaded wholesale from CSV
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Parse a CSV document with a header row
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(DatasetError::Empty);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(DatasetError::Empty);
        }
        let names = unique_column_names(headers.iter());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect::<Vec<_>>());
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| ColumnInfo {
                kind: infer_kind(&rows, idx),
                name,
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Indices of numeric columns, in column order
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::Numeric)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Vec<Vec<Cell>> {
        self.rows.iter().take(n).cloned().collect()
    }
}

fn infer_kind(rows: &[Vec<Cell>], idx: usize) -> ColumnKind {
    let mut seen_number = false;
    for row in rows {
        match row.get(idx) {
            Some(Cell::Number(_)) => seen_number = true,
            Some(Cell::Text(_)) => return ColumnKind::Text,
            Some(Cell::Missing) | None => {}
        }
    }
    if seen_number {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Blank headers become `Unnamed: {idx}`; repeats get `.1`, `.2`, ... suffixes
fn unique_column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (idx, raw) in headers.enumerate() {
        let base = match raw.trim() {
            "" => format!("Unnamed: {}", idx),
            name => name.to_string(),
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}
