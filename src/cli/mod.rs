//! CLI module
//!
//! Command-line interface for the loader.
//!
//! # Commands
//!
//! - `run` - Scheduled sync cycles until Ctrl-C
//! - `once` - One sync cycle
//! - `load` - Load local files directly
//! - `check` - Test the destination connection
//! - `schema` - Show an entity's destination schema

mod commands;
mod runner;

pub use commands::{Cli, Commands, ConfigOverrides, OutputFormat};
pub use runner::Runner;
