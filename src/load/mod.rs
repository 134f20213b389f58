//! Typed batch loading
//!
//! The loader turns the records of one file into a single transactional batch:
//!
//! 1. The first record carrying an entity type fixes the batch's table; its
//!    schema is resolved and one positional INSERT is built from it.
//! 2. Every record of that entity type is coerced column by column
//!    (see [`coerce`]) and appended to the batch.
//! 3. The batch is executed and committed in one transaction. Rows reporting
//!    no effect are logged as anomalies; they do not roll the batch back.
//!
//! ```text
//! OPEN → SCHEMA_RESOLVED → BATCHING → COMMITTED
//!   └──────────┴──────────────┴─────→ FAILED
//! ```

mod coerce;
mod types;

pub use coerce::{coerce, coerce_row, TIMESTAMP_FORMAT, TIMESTAMP_PREFIX_CHARS};
pub use types::{
    quote_ident, BatchOutcome, FileState, InsertBatch, InsertStatement, LoadReport, SqlValue,
};

use crate::database::Destination;
use crate::error::{Error, Result};
use crate::extract::RawRecord;
use crate::schema::{ColumnSchema, SchemaResolver};

/// Build the positional insert for a schema
pub fn build_insert(schema: &ColumnSchema) -> InsertStatement {
    InsertStatement {
        entity_type: schema.entity_type.clone(),
        columns: schema.column_names().map(ToString::to_string).collect(),
    }
}

/// Coerces records and loads them in per-file batches
#[derive(Debug, Default)]
pub struct TypedLoader {
    resolver: SchemaResolver,
}

impl TypedLoader {
    /// Create a loader around a schema resolver
    pub fn new(resolver: SchemaResolver) -> Self {
        Self { resolver }
    }

    /// Schema resolver in use
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Load one file's records through `destination`.
    ///
    /// Schema and commit failures abort this file only and are returned as
    /// errors; coercion failures null the affected field.
    pub fn load(
        &mut self,
        destination: &mut dyn Destination,
        file: &str,
        records: &[RawRecord],
    ) -> Result<LoadReport> {
        self.resolver.begin_file();

        let mut report = LoadReport::new(file);

        let Some(entity_type) = records.iter().find_map(|r| r.entity_type.as_deref()) else {
            report.skipped = records.len();
            report.state = FileState::Committed;
            tracing::debug!(file, "No typed records to load");
            return Ok(report);
        };
        report.entity_type = Some(entity_type.to_string());

        let schema = match self.resolver.resolve(destination, entity_type) {
            Ok(schema) => schema,
            Err(e) => return Err(fail(&mut report, e)),
        };
        report.state = FileState::SchemaResolved;

        let statement = build_insert(&schema);
        let mut batch = InsertBatch::new(entity_type);

        for record in records {
            match record.entity_type.as_deref() {
                Some(record_type) if record_type == entity_type => {
                    let (row, nulled) = coerce_row(&schema, record);
                    report.nulled_fields += nulled;
                    batch.push(row);
                    report.state = FileState::Batching;
                }
                Some(record_type) => {
                    report.skipped += 1;
                    tracing::warn!(
                        file,
                        entity_type,
                        record_type,
                        "Skipping record of a different entity type"
                    );
                }
                None => {
                    report.skipped += 1;
                    tracing::debug!(file, "Skipping record without a type discriminator");
                }
            }
        }

        let outcome = match destination.execute_batch(&statement, &batch) {
            Ok(outcome) => outcome,
            Err(e) => return Err(fail(&mut report, e)),
        };

        report.rows = batch.len();
        report.anomalies = outcome.anomalies();
        for row in &report.anomalies {
            tracing::warn!(file, entity_type, row, "Failed insert: row affected no rows");
        }
        report.state = FileState::Committed;

        Ok(report)
    }
}

/// Move a report to FAILED and hand the error back
fn fail(report: &mut LoadReport, error: Error) -> Error {
    report.state = FileState::Failed;
    tracing::debug!(
        file = %report.file,
        entity_type = report.entity_type.as_deref(),
        state = %report.state,
        "File load failed"
    );
    error
}
