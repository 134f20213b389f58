//! Configuration types for the ingestion pipeline
//!
//! The whole process is driven by one [`IngestConfig`], loaded from a YAML
//! (or JSON) file and then overridden by CLI flags and environment variables.
//!
//! ```yaml
//! download_dir: ./downloads
//! source:
//!   location: s3://summertesting
//!   transfer: command
//! destination:
//!   engine: postgres
//!   host: localhost
//!   port: 5432
//!   database: sensus
//!   user: postgres
//! schedule:
//!   interval_secs: 120
//! schema_cache: per_file
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted when no destination password is configured
pub const PASSWORD_ENV: &str = "BUCKET_LOADER_DB_PASSWORD";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Local directory files are transferred into
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Remote source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination database settings
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Cycle cadence
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// How long resolved table schemas are reused
    #[serde(default)]
    pub schema_cache: SchemaCachePolicy,

    /// Persist the seen-file ledger here (in-memory when unset)
    #[serde(default)]
    pub ledger_file: Option<PathBuf>,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            source: SourceConfig::default(),
            destination: DestinationConfig::default(),
            schedule: ScheduleConfig::default(),
            schema_cache: SchemaCachePolicy::default(),
            ledger_file: None,
        }
    }
}

impl IngestConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string (JSON is valid YAML)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: IngestConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Fill in values that may come from the environment
    pub fn apply_env(&mut self) {
        if self.destination.password.is_none() {
            if let Ok(password) = std::env::var(PASSWORD_ENV) {
                self.destination.password = Some(password);
            }
        }
    }

    /// Validate the configuration before anything is started
    pub fn validate(&self) -> Result<()> {
        if self.download_dir.as_os_str().is_empty() {
            return Err(Error::missing_field("download_dir"));
        }

        if self.source.location.trim().is_empty() {
            return Err(Error::missing_field("source.location"));
        }

        if let Some(command) = &self.source.command {
            if command.is_empty() {
                return Err(Error::invalid_value(
                    "source.command",
                    "command must name a program",
                ));
            }
        }

        if self.schedule.interval_secs == 0 {
            return Err(Error::invalid_value(
                "schedule.interval_secs",
                "interval must be at least one second",
            ));
        }

        self.destination.validate()
    }
}

// ============================================================================
// Source
// ============================================================================

/// How files get from the remote store to local disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Run an external copy command and scrape its transcript
    #[default]
    Command,
    /// List and fetch through the object store API
    Native,
}

/// Remote source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote location (`s3://bucket/prefix`, `gs://...`, `az://...`, or a local path)
    #[serde(default = "default_source_location")]
    pub location: String,

    /// Transfer mechanism
    #[serde(default)]
    pub transfer: TransferMode,

    /// Custom transfer command; `{source}` and `{download_dir}` are substituted
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

fn default_source_location() -> String {
    "s3://summertesting".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: default_source_location(),
            transfer: TransferMode::default(),
            command: None,
        }
    }
}

impl SourceConfig {
    /// Full command line (program first) for the command transfer
    pub fn command_line(&self, download_dir: &Path) -> Vec<String> {
        let download_dir = download_dir.to_string_lossy();
        match &self.command {
            Some(command) => command
                .iter()
                .map(|arg| {
                    arg.replace("{source}", &self.location)
                        .replace("{download_dir}", &download_dir)
                })
                .collect(),
            None => vec![
                "aws".to_string(),
                "s3".to_string(),
                "cp".to_string(),
                "--recursive".to_string(),
                self.location.clone(),
                download_dir.to_string(),
            ],
        }
    }
}

// ============================================================================
// Destination
// ============================================================================

/// Supported destination engines, all reached through DuckDB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbType {
    /// PostgreSQL
    #[default]
    Postgres,
    /// SQLite file
    Sqlite,
    /// DuckDB file
    Duckdb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::Postgres => write!(f, "postgres"),
            DbType::Sqlite => write!(f, "sqlite"),
            DbType::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// Destination database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Engine type
    #[serde(default)]
    pub engine: DbType,
    /// Full connection string, used verbatim when present
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Database name, or file path for sqlite/duckdb
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Schema holding the entity tables (`public` for postgres, `main` otherwise)
    #[serde(default)]
    pub schema: Option<String>,
    /// SSL mode (disable, prefer, require)
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

fn default_ssl_mode() -> String {
    "prefer".to_string()
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            engine: DbType::default(),
            connection_string: None,
            host: None,
            port: None,
            database: None,
            user: None,
            password: None,
            schema: None,
            ssl_mode: default_ssl_mode(),
        }
    }
}

impl DestinationConfig {
    /// Destination backed by a local DuckDB file
    pub fn duckdb(path: impl Into<String>) -> Self {
        Self {
            engine: DbType::Duckdb,
            database: Some(path.into()),
            ..Self::default()
        }
    }

    /// Schema that entity tables are looked up in
    pub fn table_schema(&self) -> &str {
        match (&self.schema, self.engine) {
            (Some(schema), _) => schema,
            (None, DbType::Postgres) => "public",
            (None, DbType::Sqlite | DbType::Duckdb) => "main",
        }
    }

    /// Build the connection string handed to DuckDB's ATTACH
    pub fn connection_string(&self) -> Result<String> {
        if let Some(conn_str) = &self.connection_string {
            return Ok(conn_str.clone());
        }

        match self.engine {
            DbType::Postgres => {
                let host = self.host.as_deref().unwrap_or("localhost");
                let port = self.port.unwrap_or(5432);
                let user = self.user.as_deref().unwrap_or("postgres");
                let password = self.password.as_deref().unwrap_or_default();
                let database = self
                    .database
                    .as_deref()
                    .ok_or_else(|| Error::missing_field("destination.database"))?;
                Ok(format!(
                    "postgresql://{user}:{password}@{host}:{port}/{database}?sslmode={}",
                    self.ssl_mode
                ))
            }
            // File-based engines use database as the file path
            DbType::Sqlite | DbType::Duckdb => self
                .database
                .clone()
                .ok_or_else(|| Error::missing_field("destination.database")),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.connection_string.is_none() && self.database.is_none() {
            return Err(Error::missing_field("destination.database"));
        }
        if matches!(self.port, Some(0)) {
            return Err(Error::invalid_value("destination.port", "port cannot be 0"));
        }
        Ok(())
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Scheduling cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycle starts
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Run the first cycle at startup instead of after one interval
    #[serde(default = "default_true")]
    pub run_immediately: bool,
}

fn default_interval_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            run_immediately: true,
        }
    }
}

impl ScheduleConfig {
    /// Cycle period
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Lifetime of cached table schemas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCachePolicy {
    /// Re-resolve for every file
    #[default]
    PerFile,
    /// Resolve once per entity type for the process lifetime
    PerRun,
}
