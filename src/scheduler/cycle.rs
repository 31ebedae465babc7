//! Cycle/sleep loop shared by both harvest modes
//!
//! A [`CyclicScheduler`] alternates between running a cycle (assemble a
//! batch, then process each item in order) and sleeping. It never stops on
//! its own; the only way out is the shutdown channel, which is checked
//! between items and while sleeping.

use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::models::CycleStats;

/// One harvest mode as seen by the scheduler
#[async_trait]
pub trait Harvest: Send {
    /// Unit of work processed sequentially within a cycle
    type Item: Debug + Send + Sync;

    /// Mode name used in log fields
    fn name(&self) -> &'static str;

    /// Build the batch for the next cycle
    async fn assemble(&mut self) -> Vec<Self::Item>;

    /// Fetch, normalize and submit one item. Failures are counted, never raised.
    async fn process(&self, item: &Self::Item) -> CycleStats;
}

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    CycleRunning,
    Sleeping,
    Stopped,
}

/// Totals over the lifetime of a [`CyclicScheduler::run`] call
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub cycles: u64,
    pub totals: CycleStats,
}

/// Runs a [`Harvest`] forever with a fixed sleep between cycles
pub struct CyclicScheduler<H: Harvest> {
    harvest: H,
    sleep: Duration,
    cycle: u64,
    phase: Phase,
}

impl<H: Harvest> CyclicScheduler<H> {
    pub fn new(harvest: H, sleep: Duration) -> Self {
        Self {
            harvest,
            sleep,
            cycle: 0,
            phase: Phase::Start,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn harvest(&self) -> &H {
        &self.harvest
    }

    /// Run a single cycle to completion, ignoring shutdown
    pub async fn run_once(&mut self) -> CycleStats {
        let (_tx, rx) = watch::channel(false);
        self.cycle_until(rx).await.unwrap_or_default()
    }

    /// Run a single cycle; `None` when `shutdown` interrupted it
    pub async fn run_once_until(&mut self, shutdown: watch::Receiver<bool>) -> Option<CycleStats> {
        let stats = self.cycle_until(shutdown).await;
        self.phase = Phase::Stopped;
        stats
    }

    /// Alternate cycles and sleeps until `shutdown` carries `true` or its
    /// sender is dropped.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::default();
        tracing::info!(
            mode = self.harvest.name(),
            sleep_secs = self.sleep.as_secs_f64(),
            "Scheduler started"
        );

        loop {
            match self.cycle_until(shutdown.clone()).await {
                Some(stats) => {
                    summary.cycles += 1;
                    summary.totals.merge(&stats);
                }
                None => break,
            }

            self.phase = Phase::Sleeping;
            tracing::debug!(mode = self.harvest.name(), secs = self.sleep.as_secs_f64(), "Sleeping");

            tokio::select! {
                _ = tokio::time::sleep(self.sleep) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        self.phase = Phase::Stopped;
        tracing::info!(
            mode = self.harvest.name(),
            cycles = summary.cycles,
            submitted = summary.totals.submitted,
            failed = summary.totals.failed,
            "Scheduler stopped"
        );
        summary
    }

    /// Run one cycle; `None` when shutdown interrupted it
    async fn cycle_until(&mut self, mut shutdown: watch::Receiver<bool>) -> Option<CycleStats> {
        if *shutdown.borrow() {
            return None;
        }

        self.cycle += 1;
        self.phase = Phase::CycleRunning;
        let started = Instant::now();
        let mode = self.harvest.name();

        let batch = tokio::select! {
            batch = self.harvest.assemble() => batch,
            _ = shutdown_requested(&mut shutdown) => return None,
        };

        if batch.is_empty() {
            tracing::warn!(mode, cycle = self.cycle, "No items assembled for this cycle");
        } else {
            tracing::info!(
                mode,
                cycle = self.cycle,
                utc = %Utc::now().to_rfc3339(),
                items = batch.len(),
                "Cycle started"
            );
        }

        let mut stats = CycleStats::default();
        for item in &batch {
            tokio::select! {
                item_stats = self.harvest.process(item) => stats.merge(&item_stats),
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!(mode, cycle = self.cycle, "Shutdown requested, leaving cycle");
                    return None;
                }
            }
        }

        stats.elapsed = started.elapsed();
        tracing::info!(
            mode,
            cycle = self.cycle,
            processed = stats.processed,
            submitted = stats.submitted,
            rejected = stats.rejected,
            skipped = stats.skipped,
            failed = stats.failed,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Cycle finished"
        );

        Some(stats)
    }
}

/// Resolves once shutdown is signalled or the sender is gone
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
