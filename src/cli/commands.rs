//! CLI commands and argument parsing

use crate::config::IngestConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Incremental bucket-to-SQL loader
#[derive(Parser, Debug)]
#[command(name = "bucket-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for reports
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags overriding values from the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Local directory files are transferred into
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Remote source location (e.g. s3://bucket/prefix)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Persist the seen-file ledger to this file
    #[arg(long, global = true)]
    pub ledger_file: Option<PathBuf>,

    /// Full destination connection string
    #[arg(long, global = true)]
    pub connection_string: Option<String>,

    /// Destination host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Destination port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Destination database (file path for sqlite/duckdb)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Destination user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Seconds between cycles
    #[arg(long, global = true)]
    pub interval: Option<u64>,
}

impl ConfigOverrides {
    /// Apply every flag that was given
    pub fn apply(&self, config: &mut IngestConfig) {
        if let Some(dir) = &self.download_dir {
            config.download_dir.clone_from(dir);
        }
        if let Some(source) = &self.source {
            config.source.location.clone_from(source);
        }
        if let Some(ledger_file) = &self.ledger_file {
            config.ledger_file = Some(ledger_file.clone());
        }

        let destination = &mut config.destination;
        if let Some(connection_string) = &self.connection_string {
            destination.connection_string = Some(connection_string.clone());
        }
        if let Some(host) = &self.host {
            destination.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            destination.port = Some(port);
        }
        if let Some(database) = &self.database {
            destination.database = Some(database.clone());
        }
        if let Some(user) = &self.user {
            destination.user = Some(user.clone());
        }

        if let Some(interval) = self.interval {
            config.schedule.interval_secs = interval;
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run sync cycles on the configured interval until Ctrl-C
    Run,

    /// Run a single sync cycle and print its report
    Once,

    /// Load local files directly, bypassing transfer and ledger
    Load {
        /// JSON files to load
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Test the destination connection
    Check,

    /// Show the destination schema for an entity type
    Schema {
        /// Entity type (table name)
        entity: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}
