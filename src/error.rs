//! Error types for bucket-loader
//!
//! This module defines the error hierarchy for the whole ingestion pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every error knows the smallest unit of work it is fatal to (see
//! [`FaultScope`]); the cycle driver uses that to decide whether to skip a
//! file, abort the cycle, or give up entirely.

use thiserror::Error;

/// The main error type for bucket-loader
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transfer Errors
    // ============================================================================
    #[error("Transfer failed: {message}")]
    Transfer { message: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Failed to parse '{file}': {message}")]
    Parse { file: String, message: String },

    // ============================================================================
    // Destination Errors
    // ============================================================================
    #[error("Destination connection failed: {message}")]
    Connection { message: String },

    #[error("No destination table for entity type '{entity_type}': {message}")]
    Schema {
        entity_type: String,
        message: String,
    },

    #[error("Failed to load '{entity_type}' batch: {message}")]
    Commit {
        entity_type: String,
        message: String,
    },

    // ============================================================================
    // Ledger Errors
    // ============================================================================
    #[error("Ledger error: {message}")]
    Ledger { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// The smallest unit of work an error is fatal to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FaultScope {
    /// One source file; the cycle moves on to the next file
    File,
    /// The current cycle; the scheduler retries at the next tick
    Cycle,
    /// The whole process; only raised during startup
    Process,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transfer error
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }

    /// Create a parse error for a source file
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    /// Create a commit error
    pub fn commit(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Commit {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    /// Create a ledger error
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::Ledger {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Unit of work this error aborts
    pub fn scope(&self) -> FaultScope {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_) => FaultScope::Process,
            Error::Transfer { .. }
            | Error::ObjectStore(_)
            | Error::Connection { .. }
            | Error::Ledger { .. } => FaultScope::Cycle,
            Error::JsonParse(_)
            | Error::Parse { .. }
            | Error::Schema { .. }
            | Error::Commit { .. }
            | Error::Io(_)
            | Error::FileNotFound { .. } => FaultScope::File,
        }
    }

    /// Entity type the error relates to, if known
    pub fn entity_type(&self) -> Option<&str> {
        match self {
            Error::Schema { entity_type, .. } | Error::Commit { entity_type, .. } => {
                Some(entity_type)
            }
            _ => None,
        }
    }
}

/// Result type alias for bucket-loader
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("database");
        assert_eq!(err.to_string(), "Missing required config field: database");

        let err = Error::schema("locationdatum", "table does not exist");
        assert_eq!(
            err.to_string(),
            "No destination table for entity type 'locationdatum': table does not exist"
        );
    }

    #[test]
    fn test_fault_scope() {
        assert_eq!(Error::config("bad").scope(), FaultScope::Process);
        assert_eq!(Error::transfer("aws missing").scope(), FaultScope::Cycle);
        assert_eq!(Error::connection("refused").scope(), FaultScope::Cycle);
        assert_eq!(Error::parse("a.json", "eof").scope(), FaultScope::File);
        assert_eq!(Error::schema("foo", "missing").scope(), FaultScope::File);
        assert_eq!(Error::commit("foo", "deadlock").scope(), FaultScope::File);
        assert_eq!(Error::file_not_found("a.json").scope(), FaultScope::File);
        assert_eq!(Error::ledger("disk full").scope(), FaultScope::Cycle);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io).scope(), FaultScope::File);
    }

    #[test]
    fn test_fault_scope_ordering() {
        assert!(FaultScope::File < FaultScope::Cycle);
        assert!(FaultScope::Cycle < FaultScope::Process);
    }

    #[test]
    fn test_entity_type() {
        assert_eq!(Error::schema("foo", "x").entity_type(), Some("foo"));
        assert_eq!(Error::commit("bar", "x").entity_type(), Some("bar"));
        assert_eq!(Error::transfer("x").entity_type(), None);
    }
}
