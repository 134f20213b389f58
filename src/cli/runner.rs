//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::IngestConfig;
use crate::error::{Error, FaultScope, Result};
use crate::pipeline::{CycleReport, Ingestor, Pipeline};
use crate::scheduler::Scheduler;
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.build_config()?;
        match &self.cli.command {
            Commands::Run => self.run_scheduled(&config).await,
            Commands::Once => self.run_once(&config).await,
            Commands::Load { files } => self.load(&config, files).await,
            Commands::Check => self.check(&config),
            Commands::Schema { entity } => self.schema(&config, entity),
        }
    }

    /// Assemble the effective configuration: file, then flags, then environment
    pub fn build_config(&self) -> Result<IngestConfig> {
        let mut config = match &self.cli.config {
            Some(path) => IngestConfig::from_file(path)?,
            None => IngestConfig::default(),
        };
        self.cli.overrides.apply(&mut config);
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Verify the destination before any cycle runs
    fn handshake(ingestor: &Ingestor) -> Result<()> {
        let target = ingestor.connector().describe();
        ingestor.connector().check().map_err(|e| {
            tracing::error!(destination = %target, error = %e, "Destination handshake failed");
            e
        })?;
        tracing::info!(destination = %target, "Destination reachable");
        Ok(())
    }

    async fn run_scheduled(&self, config: &IngestConfig) -> Result<()> {
        let pipeline = Pipeline::from_config(config)?;
        Self::handshake(pipeline.ingestor())?;

        let mut scheduler = Scheduler::from_config(pipeline, &config.schedule);
        let cycles = scheduler.run().await;
        tracing::info!(cycles, "Stopped");
        Ok(())
    }

    async fn run_once(&self, config: &IngestConfig) -> Result<()> {
        let pipeline = Pipeline::from_config(config)?;
        Self::handshake(pipeline.ingestor())?;

        let mut scheduler = Scheduler::from_config(pipeline, &config.schedule);
        let report = scheduler.run_once().await?;
        self.output(&report);
        Ok(())
    }

    async fn load(&self, config: &IngestConfig, files: &[String]) -> Result<()> {
        let start = Instant::now();
        let mut ingestor = Ingestor::from_config(config);
        Self::handshake(&ingestor)?;

        let mut report = CycleReport::new();
        report.files_discovered = files.len();
        for file in files {
            match ingestor.load_file(file).await {
                Ok(load) => report.add_loaded(load),
                Err(e) if e.scope() == FaultScope::File => {
                    tracing::error!(
                        file = file.as_str(),
                        entity_type = e.entity_type(),
                        error = %e,
                        "Skipping file"
                    );
                    report.add_failed(file, &e);
                }
                Err(e) => return Err(e),
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        self.output(&report);
        Ok(())
    }

    fn check(&self, config: &IngestConfig) -> Result<()> {
        let ingestor = Ingestor::from_config(config);
        let target = ingestor.connector().describe();

        match ingestor.connector().check() {
            Ok(()) => {
                self.output(&json!({
                    "status": "SUCCEEDED",
                    "destination": target,
                }));
                Ok(())
            }
            Err(e) => {
                self.output(&json!({
                    "status": "FAILED",
                    "destination": target,
                    "message": e.to_string(),
                }));
                Err(Error::connection(format!("Connection check failed: {e}")))
            }
        }
    }

    fn schema(&self, config: &IngestConfig, entity: &str) -> Result<()> {
        let ingestor = Ingestor::from_config(config);
        let schema = ingestor.describe(entity)?;
        self.output(&schema);
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbType;
    use clap::Parser;
    use std::io::Write;

    fn runner(args: &[&str]) -> Runner {
        let mut argv = vec!["bucket-loader"];
        argv.extend_from_slice(args);
        Runner::new(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_build_config_from_file_and_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "download_dir: /var/lib/loader\ndestination:\n  engine: duckdb\n  database: from-file.duckdb"
        )
        .unwrap();

        let runner = runner(&[
            "-C",
            file.path().to_str().unwrap(),
            "--database",
            "from-flag.duckdb",
            "check",
        ]);
        let config = runner.build_config().unwrap();

        assert_eq!(config.download_dir.to_str(), Some("/var/lib/loader"));
        assert_eq!(config.destination.engine, DbType::Duckdb);
        assert_eq!(
            config.destination.database.as_deref(),
            Some("from-flag.duckdb")
        );
    }

    #[test]
    fn test_build_config_rejects_invalid() {
        let runner = runner(&["--database", "db", "--interval", "0", "once"]);
        let err = runner.build_config().unwrap_err();
        assert_eq!(err.scope(), FaultScope::Process);
    }

    #[test]
    fn test_build_config_missing_file() {
        let runner = runner(&["-C", "/no/such/ingest.yaml", "check"]);
        assert!(runner.build_config().is_err());
    }

    #[tokio::test]
    async fn test_load_command_into_duckdb() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("dest.duckdb");
        {
            let conn = duckdb::Connection::open(&db_path).unwrap();
            conn.execute_batch("CREATE TABLE foo (name VARCHAR, ison BOOLEAN);")
                .unwrap();
        }
        let data = dir.path().join("a.json");
        std::fs::write(
            &data,
            r#"[{"$type":"X.FooY, v1","Name":"a","On":"true"}]"#,
        )
        .unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "destination:\n  engine: duckdb\n  database: {}",
            db_path.display()
        )
        .unwrap();

        let runner = runner(&[
            "-C",
            file.path().to_str().unwrap(),
            "load",
            data.to_str().unwrap(),
        ]);
        runner.run().await.unwrap();

        let conn = duckdb::Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM foo WHERE ison", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
