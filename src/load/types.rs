//! Loader types
//!
//! Typed parameter values, the per-entity insert statement, the pending batch
//! and the reports produced once a file is loaded.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A coerced, typed SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Float(f64),
}

impl SqlValue {
    /// Whether this binds SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// Parameterized insert for one entity type
///
/// Column list and placeholder count always match the resolved schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Destination table
    pub entity_type: String,
    /// Columns in schema order
    pub columns: Vec<String>,
}

impl InsertStatement {
    /// Number of positional parameters
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Render the statement against a (possibly qualified) table reference.
    ///
    /// Shape: `INSERT INTO <table> ("c1", "c2") SELECT ?, ?;`
    pub fn to_sql(&self, table: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!("INSERT INTO {table} ({columns}) SELECT {placeholders};")
    }
}

/// Quote an SQL identifier
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Rows awaiting a single commit, all for one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBatch {
    entity_type: String,
    rows: Vec<Vec<SqlValue>>,
}

impl InsertBatch {
    /// Create an empty batch bound to an entity type
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            rows: Vec::new(),
        }
    }

    /// Entity type every row belongs to
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Append a coerced row
    pub fn push(&mut self, row: Vec<SqlValue>) {
        self.rows.push(row);
    }

    /// Pending rows
    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    /// Number of pending rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there is nothing to insert
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What the destination reported for an executed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Affected row count per batch member, in batch order
    pub row_counts: Vec<usize>,
}

impl BatchOutcome {
    /// Indices of rows that affected fewer than one row
    pub fn anomalies(&self) -> Vec<usize> {
        self.row_counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count < 1)
            .map(|(index, _)| index)
            .collect()
    }

    /// Total affected rows
    pub fn affected(&self) -> usize {
        self.row_counts.iter().sum()
    }
}

/// Per-file load state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Open,
    SchemaResolved,
    Batching,
    Committed,
    Failed,
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileState::Open => write!(f, "OPEN"),
            FileState::SchemaResolved => write!(f, "SCHEMA_RESOLVED"),
            FileState::Batching => write!(f, "BATCHING"),
            FileState::Committed => write!(f, "COMMITTED"),
            FileState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Result of loading one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Source file
    pub file: String,
    /// Entity type of the batch, if any record carried one
    pub entity_type: Option<String>,
    /// Final state
    pub state: FileState,
    /// Rows sent to the destination
    pub rows: usize,
    /// Records skipped (no entity type, or a different one than the batch)
    pub skipped: usize,
    /// Field values that could not be coerced and were bound as NULL
    pub nulled_fields: usize,
    /// Batch members that affected fewer than one row
    pub anomalies: Vec<usize>,
}

impl LoadReport {
    /// Empty report for a file
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            entity_type: None,
            state: FileState::Open,
            rows: 0,
            skipped: 0,
            nulled_fields: 0,
            anomalies: Vec::new(),
        }
    }
}
