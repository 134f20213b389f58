// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # bucket-loader
//!
//! Incrementally mirrors a remote object-storage bucket of JSON data files and
//! loads each new file into a pre-existing, typed SQL table.
//!
//! ## Features
//!
//! - **Incremental transfer**: Each file reported by the transfer is loaded at most once
//! - **Schema driven**: Column types are read from the live destination table
//! - **Lossy coercion**: Values that don't fit their column become NULL, never errors
//! - **Per-file transactions**: One batch and one commit per source file
//! - **Fault isolation**: A bad file is skipped; a bad cycle is retried on the next tick
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bucket_loader::config::IngestConfig;
//! use bucket_loader::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> bucket_loader::Result<()> {
//!     let config = IngestConfig::from_file("ingest.yaml")?;
//!     let mut pipeline = Pipeline::from_config(&config)?;
//!     let report = pipeline.run_cycle().await?;
//!     println!("loaded {} rows", report.rows_loaded);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌────────────┐
//! │ Scheduler │──▶│ RemoteLister │──▶│ SyncLedger │
//! └───────────┘   └──────────────┘   └─────┬──────┘
//!                                          │ new files
//!        ┌─────────────────────────────────┘
//!        ▼
//! ┌─────────────────┐   ┌────────────────┐   ┌─────────────┐
//! │ RecordExtractor │──▶│ SchemaResolver │──▶│ TypedLoader │──▶ destination
//! └─────────────────┘   └────────────────┘   └─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and fault scopes
pub mod error;

/// Configuration file and defaults
pub mod config;

/// Seen-file ledger
pub mod ledger;

/// Remote transfer (command and object store)
pub mod transfer;

/// JSON record extraction
pub mod extract;

/// Destination schema resolution
pub mod schema;

/// Value coercion and batch loading
pub mod load;

/// Destination database support via DuckDB
pub mod database;

/// Sync cycle driver
pub mod pipeline;

/// Interval scheduling
pub mod scheduler;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FaultScope, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
