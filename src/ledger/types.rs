//! Ledger types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Set of file paths already ingested
///
/// Paths are never removed. The ledger is not synchronized; a single cycle
/// driver owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLedger {
    #[serde(default)]
    seen: HashSet<String>,
}

impl SyncLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a path has already been seen
    pub fn has(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    /// Record a path as seen; returns `true` if it was new
    pub fn mark_seen(&mut self, path: impl Into<String>) -> bool {
        self.seen.insert(path.into())
    }

    /// Number of seen paths
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been seen yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Filter `paths` down to the ones not seen before, marking each as seen.
    ///
    /// Duplicates within `paths` are emitted once.
    pub fn admit<I, S>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths
            .into_iter()
            .map(Into::into)
            .filter(|path| self.mark_seen(path.clone()))
            .collect()
    }
}
