//! Tests for scheduler module

use super::*;
use crate::config::ScheduleConfig;
use crate::database::memory::MemoryConnector;
use crate::error::Error;
use crate::ledger::LedgerStore;
use crate::load::TypedLoader;
use crate::pipeline::Ingestor;
use crate::transfer::RemoteLister;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Lister counting transfers, optionally failing every one
struct CountingLister {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl RemoteLister for CountingLister {
    async fn transfer(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::transfer("bucket unreachable"));
        }
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

fn pipeline(fail: bool) -> (Pipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let lister = CountingLister {
        calls: calls.clone(),
        fail,
    };
    let pipeline = Pipeline::new(
        Box::new(lister),
        LedgerStore::in_memory(),
        Ingestor::new(Box::new(MemoryConnector::default()), TypedLoader::default()),
    );
    (pipeline, calls)
}

/// Lister whose first transfer overruns the interval
#[derive(Clone, Default)]
struct SlowStartLister {
    overrun: Duration,
    starts: Arc<Mutex<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteLister for SlowStartLister {
    async fn transfer(&self) -> Result<Vec<String>> {
        let first = {
            let mut starts = self.starts.lock().unwrap();
            starts.push(Instant::now());
            starts.len() == 1
        };
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if first {
            tokio::time::sleep(self.overrun).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "slow-start".to_string()
    }
}

#[tokio::test]
async fn test_runs_immediately_then_on_interval() {
    let (pipeline, calls) = pipeline(false);
    let mut scheduler = Scheduler::new(pipeline, Duration::from_millis(20), true);

    let cycles = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(110)))
        .await;

    assert!(cycles >= 2, "expected several cycles, got {cycles}");
    assert_eq!(calls.load(Ordering::SeqCst), cycles);
}

#[tokio::test]
async fn test_waits_for_first_tick() {
    let (pipeline, calls) = pipeline(false);
    let mut scheduler = Scheduler::new(pipeline, Duration::from_secs(3600), false);

    let cycles = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(20)))
        .await;

    assert_eq!(cycles, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_cycles_keep_running() {
    let (pipeline, calls) = pipeline(true);
    let mut scheduler = Scheduler::new(pipeline, Duration::from_millis(10), true);

    let cycles = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(80)))
        .await;

    assert!(cycles >= 2, "expected retries, got {cycles}");
    assert_eq!(calls.load(Ordering::SeqCst), cycles);
}

#[tokio::test]
async fn test_shutdown_before_start() {
    let (pipeline, _) = pipeline(false);
    let mut scheduler = Scheduler::new(pipeline, Duration::from_millis(10), true);

    // shutdown wins over a ready tick
    let cycles = scheduler.run_until(async {}).await;
    assert_eq!(cycles, 0);
}

#[tokio::test]
async fn test_run_once() {
    let (pipeline, calls) = pipeline(false);
    let mut scheduler = Scheduler::from_config(pipeline, &ScheduleConfig::default());

    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.files_discovered, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overrun_skips_missed_ticks() {
    let lister = SlowStartLister {
        overrun: Duration::from_millis(175),
        ..SlowStartLister::default()
    };
    let pipeline = Pipeline::new(
        Box::new(lister.clone()),
        LedgerStore::in_memory(),
        Ingestor::new(Box::new(MemoryConnector::default()), TypedLoader::default()),
    );
    let mut scheduler = Scheduler::new(pipeline, Duration::from_millis(50), true);

    let base = Instant::now();
    let cycles = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(240)))
        .await;

    // ticks at 50, 100 and 150 fall inside the first cycle and are dropped
    let offsets: Vec<u128> = lister
        .starts
        .lock()
        .unwrap()
        .iter()
        .map(|start| start.duration_since(base).as_millis())
        .collect();
    assert_eq!(offsets, vec![0, 175, 200]);
    assert_eq!(cycles, 3);
    assert_eq!(lister.max_in_flight.load(Ordering::SeqCst), 1);
}
