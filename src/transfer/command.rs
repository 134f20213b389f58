//! External command transfer

use super::{parse_transcript, RemoteLister};
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs a copy command and scrapes its stdout for downloaded paths
#[derive(Debug, Clone)]
pub struct CommandLister {
    program: String,
    args: Vec<String>,
    download_dir: PathBuf,
}

impl CommandLister {
    /// Create a lister from a full command line (program first)
    pub fn new(command_line: Vec<String>, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut parts = command_line.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::invalid_value("source.command", "command must not be empty"))?;

        Ok(Self {
            program,
            args: parts.collect(),
            download_dir: download_dir.into(),
        })
    }

    /// Create a lister from the source configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(
            config.source.command_line(&config.download_dir),
            config.download_dir.clone(),
        )
    }

    /// Program that will be run
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl RemoteLister for CommandLister {
    async fn transfer(&self) -> Result<Vec<String>> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| {
                Error::transfer(format!(
                    "cannot create download dir {}: {e}",
                    self.download_dir.display()
                ))
            })?;

        tracing::debug!(program = %self.program, args = ?self.args, "Starting transfer");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::transfer(format!("failed to run '{}': {e}", self.program)))?;

        if !output.status.success() {
            // Partial transfers still report what they downloaded
            tracing::warn!(
                program = %self.program,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Transfer command exited unsuccessfully"
            );
        }

        let transcript = String::from_utf8_lossy(&output.stdout);
        Ok(parse_transcript(&transcript))
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
