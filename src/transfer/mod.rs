//! Remote file transfer
//!
//! A [`RemoteLister`] mirrors the remote source into the download directory
//! and reports the local paths it transferred. Two implementations exist:
//!
//! - [`CommandLister`] - runs an external copy command (by default
//!   `aws s3 cp --recursive`) and scrapes its transcript
//! - [`ObjectStoreLister`] - lists and fetches through `object_store`
//!
//! [`discover_new`] filters a transfer's paths through the ledger.

mod command;
mod native;

pub use command::CommandLister;
pub use native::{ObjectStoreLister, RemoteSource};

use crate::config::{IngestConfig, TransferMode};
use crate::error::Result;
use crate::ledger::LedgerStore;
use async_trait::async_trait;

/// Substring marking a transcript line as a completed download
pub const DOWNLOAD_MARKER: &str = "download";

/// Source of transferred file paths
#[async_trait]
pub trait RemoteLister: Send + Sync {
    /// Run one transfer and return every local path it reported
    async fn transfer(&self) -> Result<Vec<String>>;

    /// Human-readable source for logs
    fn describe(&self) -> String;
}

/// Build the lister selected by the configuration
pub fn lister_from_config(config: &IngestConfig) -> Result<Box<dyn RemoteLister>> {
    Ok(match config.source.transfer {
        TransferMode::Command => Box::new(CommandLister::from_config(config)?),
        TransferMode::Native => Box::new(ObjectStoreLister::from_config(config)?),
    })
}

/// Extract downloaded paths from a transfer transcript.
///
/// A line counts only if it contains [`DOWNLOAD_MARKER`]; the path is its
/// last whitespace-separated token. Carriage returns end lines too, since
/// progress output rewrites the current line.
pub fn parse_transcript(transcript: &str) -> Vec<String> {
    transcript
        .split(['\n', '\r'])
        .filter(|line| line.contains(DOWNLOAD_MARKER))
        .filter_map(|line| line.split_whitespace().last())
        .map(ToString::to_string)
        .collect()
}

/// Run a transfer and admit its paths into the ledger.
///
/// Returns only paths never seen before; they are marked seen (and the
/// ledger saved) before anything is loaded. If the ledger cannot be saved
/// nothing is admitted and the error is returned.
pub async fn discover_new(
    lister: &dyn RemoteLister,
    ledger: &mut LedgerStore,
) -> Result<Vec<String>> {
    let reported = lister.transfer().await?;
    let reported_count = reported.len();

    let new_files = ledger.admit(reported).await?;

    tracing::info!(
        source = %lister.describe(),
        reported = reported_count,
        new = new_files.len(),
        seen = ledger.ledger().len(),
        "Transfer complete"
    );

    Ok(new_files)
}
