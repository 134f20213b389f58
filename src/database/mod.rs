//! Destination database support via DuckDB
//!
//! The loader talks to the destination through the [`Destination`] trait and
//! obtains one connection per file from a [`Connector`]. The production
//! implementation runs DuckDB in-process and ATTACHes the real destination
//! (PostgreSQL, SQLite or a DuckDB file) under a fixed alias.

mod engine;
#[cfg(test)]
pub(crate) mod memory;

pub use engine::{DestinationEngine, DuckDbConnector, DEST_ALIAS};

use crate::error::Result;
use crate::load::{BatchOutcome, InsertBatch, InsertStatement};
use crate::schema::ColumnSchema;

/// One open destination connection
pub trait Destination: Send {
    /// Read the column layout of the table named `entity_type`.
    ///
    /// Fails with [`Error::Schema`](crate::Error::Schema) when no such table exists.
    fn describe_table(&mut self, entity_type: &str) -> Result<ColumnSchema>;

    /// Execute every row of `batch` with `statement` inside one transaction
    /// and commit it, reporting affected row counts per row.
    fn execute_batch(
        &mut self,
        statement: &InsertStatement,
        batch: &InsertBatch,
    ) -> Result<BatchOutcome>;
}

/// Factory for destination connections
pub trait Connector: Send + Sync {
    /// Open a new connection
    fn connect(&self) -> Result<Box<dyn Destination>>;

    /// Verify the destination is reachable
    fn check(&self) -> Result<()> {
        self.connect().map(|_| ())
    }

    /// Human-readable target for logs (no secrets)
    fn describe(&self) -> String;
}
