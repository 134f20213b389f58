//! Fixed-interval cycle scheduling
//!
//! Cycles never overlap: a tick that fires while a cycle is still running is
//! skipped. A failed cycle is logged and retried at the next tick.

use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::pipeline::{CycleReport, Pipeline};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Runs a pipeline on a fixed interval
pub struct Scheduler {
    pipeline: Pipeline,
    interval: Duration,
    run_immediately: bool,
}

impl Scheduler {
    /// Create a scheduler; the interval is at least one millisecond
    pub fn new(pipeline: Pipeline, interval: Duration, run_immediately: bool) -> Self {
        Self {
            pipeline,
            interval: interval.max(Duration::from_millis(1)),
            run_immediately,
        }
    }

    /// Create a scheduler from the schedule configuration
    pub fn from_config(pipeline: Pipeline, schedule: &ScheduleConfig) -> Self {
        Self::new(pipeline, schedule.interval(), schedule.run_immediately)
    }

    /// The scheduled pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a single cycle now
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        self.pipeline.run_cycle().await
    }

    /// Run until Ctrl-C or SIGTERM, finishing the current cycle first
    pub async fn run(&mut self) -> usize {
        self.run_until(shutdown_signal()).await
    }

    /// Run cycles until `shutdown` completes; returns the number of cycles run
    pub async fn run_until<F>(&mut self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let first = if self.run_immediately {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = tokio::time::interval_at(first, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            run_immediately = self.run_immediately,
            "Scheduler started"
        );

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!(cycles, "Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {}
            }

            cycles += 1;
            if let Err(e) = self.pipeline.run_cycle().await {
                tracing::error!(
                    cycle = cycles,
                    error = %e,
                    "Cycle aborted, retrying at next tick"
                );
            }
        }

        cycles
    }
}

/// Resolves on the first Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests;
