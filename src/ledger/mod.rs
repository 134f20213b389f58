//! Seen-file ledger
//!
//! Tracks which transferred files have already been handed to the loader so
//! that each file is ingested at most once per ledger lifetime.
//!
//! # Overview
//!
//! - `SyncLedger` - The pure in-memory set of seen paths
//! - `LedgerStore` - Owns a ledger and optionally persists it to a JSON file

mod manager;
mod types;

pub use manager::LedgerStore;
pub use types::SyncLedger;
