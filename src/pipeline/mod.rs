//! Sync cycle driver
//!
//! One cycle runs the transfer, admits new paths into the ledger and then
//! loads each new file in order over its own destination connection:
//!
//! ```text
//! RemoteLister → SyncLedger → for each file:
//!     read → extract_records → connect → TypedLoader::load → commit
//! ```
//!
//! File-scoped faults are logged and the next file is processed; transfer,
//! ledger and connection faults abort the cycle.

mod types;

pub use types::CycleReport;

use crate::config::IngestConfig;
use crate::database::{Connector, DuckDbConnector};
use crate::error::{Error, FaultScope, Result};
use crate::extract::extract_records;
use crate::ledger::LedgerStore;
use crate::load::{LoadReport, TypedLoader};
use crate::schema::{ColumnSchema, SchemaResolver};
use crate::transfer::{discover_new, lister_from_config, RemoteLister};
use std::io::ErrorKind;
use std::time::Instant;

/// Loads local files into the destination
pub struct Ingestor {
    connector: Box<dyn Connector>,
    loader: TypedLoader,
}

impl Ingestor {
    /// Create an ingestor
    pub fn new(connector: Box<dyn Connector>, loader: TypedLoader) -> Self {
        Self { connector, loader }
    }

    /// Create an ingestor for the configured destination
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(
            Box::new(DuckDbConnector::new(config.destination.clone())),
            TypedLoader::new(SchemaResolver::new(config.schema_cache)),
        )
    }

    /// Destination connector
    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// Load one local file in a single transaction
    pub async fn load_file(&mut self, path: &str) -> Result<LoadReport> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::file_not_found(path)),
            Err(e) => return Err(e.into()),
        };
        let records = extract_records(path, &bytes)?;

        let mut destination = self.connector.connect()?;
        let report = self.loader.load(destination.as_mut(), path, &records)?;

        tracing::info!(
            file = path,
            entity_type = report.entity_type.as_deref(),
            rows = report.rows,
            skipped = report.skipped,
            anomalies = report.anomalies.len(),
            "File loaded"
        );
        Ok(report)
    }

    /// Resolve the destination schema of an entity type
    pub fn describe(&self, entity_type: &str) -> Result<ColumnSchema> {
        let mut destination = self.connector.connect()?;
        destination.describe_table(entity_type)
    }
}

/// Transfer, ledger and loader wired together
pub struct Pipeline {
    lister: Box<dyn RemoteLister>,
    ledger: LedgerStore,
    ingestor: Ingestor,
    /// Admitted files the last aborted cycle never loaded
    abandoned: Vec<String>,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(lister: Box<dyn RemoteLister>, ledger: LedgerStore, ingestor: Ingestor) -> Self {
        Self {
            lister,
            ledger,
            ingestor,
            abandoned: Vec::new(),
        }
    }

    /// Create a pipeline from configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Ok(Self::new(
            lister_from_config(config)?,
            LedgerStore::open(config.ledger_file.as_deref())?,
            Ingestor::from_config(config),
        ))
    }

    /// Seen-file ledger
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// File loader
    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// Files admitted to the ledger but left unloaded by the last cycle.
    ///
    /// Empty unless that cycle aborted; these files are never offered again.
    pub fn abandoned(&self) -> &[String] {
        &self.abandoned
    }

    /// Run one sync cycle
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let start = Instant::now();
        let mut report = CycleReport::new();
        self.abandoned.clear();

        let new_files = discover_new(self.lister.as_ref(), &mut self.ledger).await?;
        report.files_discovered = new_files.len();

        for (index, file) in new_files.iter().enumerate() {
            match self.ingestor.load_file(file).await {
                Ok(load) => report.add_loaded(load),
                Err(e) if e.scope() == FaultScope::File => {
                    tracing::error!(
                        file = file.as_str(),
                        entity_type = e.entity_type(),
                        error = %e,
                        "Skipping file"
                    );
                    report.add_failed(file, &e);
                }
                Err(e) => {
                    tracing::error!(file = file.as_str(), error = %e, "Aborting cycle");
                    self.abandoned = new_files[index..].to_vec();
                    tracing::warn!(
                        count = self.abandoned.len(),
                        files = ?self.abandoned,
                        "Abandoning files already marked seen"
                    );
                    return Err(e);
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            files = report.files_discovered,
            loaded = report.files_loaded,
            failed = report.files_failed,
            rows = report.rows_loaded,
            duration_ms = report.duration_ms,
            "Cycle complete"
        );
        Ok(report)
    }
}
