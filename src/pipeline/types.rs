//! Cycle report types

use crate::error::Error;
use crate::load::{FileState, LoadReport};
use serde::Serialize;

/// Statistics for one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// New files reported by the transfer
    pub files_discovered: usize,
    /// Files committed
    pub files_loaded: usize,
    /// Files that failed and were skipped
    pub files_failed: usize,
    /// Rows sent to the destination
    pub rows_loaded: usize,
    /// Records skipped across all files
    pub rows_skipped: usize,
    /// Rows that affected nothing
    pub row_anomalies: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Per-file reports in processing order
    pub files: Vec<LoadReport>,
}

impl CycleReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a committed file
    pub fn add_loaded(&mut self, report: LoadReport) {
        self.files_loaded += 1;
        self.rows_loaded += report.rows;
        self.rows_skipped += report.skipped;
        self.row_anomalies += report.anomalies.len();
        self.files.push(report);
    }

    /// Add a failed file
    pub fn add_failed(&mut self, file: &str, error: &Error) {
        self.files_failed += 1;
        let mut report = LoadReport::new(file);
        report.entity_type = error.entity_type().map(ToString::to_string);
        report.state = FileState::Failed;
        self.files.push(report);
    }
}
