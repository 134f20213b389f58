//! In-memory destination used by unit tests

use super::{Connector, Destination};
use crate::error::{Error, Result};
use crate::load::{BatchOutcome, InsertBatch, InsertStatement, SqlValue};
use crate::schema::ColumnSchema;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Shared state behind every connection of a [`MemoryConnector`]
#[derive(Debug, Default)]
pub struct MemoryState {
    /// Known tables
    pub tables: HashMap<String, ColumnSchema>,
    /// Committed rows per table
    pub rows: HashMap<String, Vec<Vec<SqlValue>>>,
    /// Number of schema lookups served
    pub describe_calls: usize,
    /// Number of connections opened
    pub connections: usize,
    /// Batch positions that report zero affected rows
    pub zero_rows: HashSet<usize>,
    /// Fail every commit
    pub fail_commit: bool,
}

/// One connection to the shared state
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    pub state: Arc<Mutex<MemoryState>>,
}

impl MemoryDestination {
    /// Destination knowing the given tables
    pub fn with_tables(tables: impl IntoIterator<Item = ColumnSchema>) -> Self {
        let dest = Self::default();
        dest.state.lock().unwrap().tables = tables
            .into_iter()
            .map(|schema| (schema.entity_type.clone(), schema))
            .collect();
        dest
    }

    /// Committed rows of a table
    pub fn rows(&self, table: &str) -> Vec<Vec<SqlValue>> {
        self.state
            .lock()
            .unwrap()
            .rows
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

impl Destination for MemoryDestination {
    fn describe_table(&mut self, entity_type: &str) -> Result<ColumnSchema> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;
        state
            .tables
            .get(entity_type)
            .cloned()
            .ok_or_else(|| Error::schema(entity_type, "table does not exist"))
    }

    fn execute_batch(
        &mut self,
        statement: &InsertStatement,
        batch: &InsertBatch,
    ) -> Result<BatchOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.fail_commit {
            return Err(Error::commit(&statement.entity_type, "commit refused"));
        }
        for row in batch.rows() {
            assert_eq!(row.len(), statement.arity(), "row arity must match statement");
        }

        let row_counts = (0..batch.len())
            .map(|i| usize::from(!state.zero_rows.contains(&i)))
            .collect();
        state
            .rows
            .entry(statement.entity_type.clone())
            .or_default()
            .extend(batch.rows().iter().cloned());

        Ok(BatchOutcome { row_counts })
    }
}

/// Connector handing out [`MemoryDestination`]s over one shared state
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    pub destination: MemoryDestination,
    pub fail_connect: bool,
}

impl Connector for MemoryConnector {
    fn connect(&self) -> Result<Box<dyn Destination>> {
        if self.fail_connect {
            return Err(Error::connection("connection refused"));
        }
        self.destination.state.lock().unwrap().connections += 1;
        Ok(Box::new(self.destination.clone()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
