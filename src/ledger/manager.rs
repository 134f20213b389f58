//! Ledger store implementation
//!
//! Owns the [`SyncLedger`] for the process and optionally persists it with
//! atomic writes.

use super::types::SyncLedger;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Owner of the seen-file ledger
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Path to the ledger file (`None` = in-memory only)
    path: Option<PathBuf>,
    /// Current ledger
    ledger: SyncLedger,
}

impl LedgerStore {
    /// Create an in-memory store (history is lost on restart)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a store backed by a file, loading existing entries if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ledger = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::ledger(format!("Failed to read ledger file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::ledger(format!("Failed to parse ledger file: {e}")))?
        } else {
            SyncLedger::new()
        };

        Ok(Self {
            path: Some(path),
            ledger,
        })
    }

    /// Create a store from an optional path
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::in_memory()),
        }
    }

    /// Current ledger
    pub fn ledger(&self) -> &SyncLedger {
        &self.ledger
    }

    /// Admit newly reported paths, returning the ones never seen before.
    ///
    /// The admitted set is written to the ledger file before it replaces the
    /// in-memory ledger; on a failed write the store is left untouched so the
    /// same paths are reported as new again next time.
    pub async fn admit<I, S>(&mut self, paths: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut candidate = self.ledger.clone();
        let new_paths = candidate.admit(paths);
        if new_paths.is_empty() {
            return Ok(new_paths);
        }

        if let Some(path) = &self.path {
            persist(path, &candidate).await?;
        }
        self.ledger = candidate;
        Ok(new_paths)
    }

    /// Ledger file path, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

/// Write a ledger to `path` through a temp file and rename
async fn persist(path: &Path, ledger: &SyncLedger) -> Result<()> {
    let contents = serde_json::to_string_pretty(ledger)
        .map_err(|e| Error::ledger(format!("Failed to serialize ledger: {e}")))?;

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &contents)
        .await
        .map_err(|e| Error::ledger(format!("Failed to write ledger file: {e}")))?;

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| Error::ledger(format!("Failed to rename ledger file: {e}")))?;

    Ok(())
}
