//! Run statistics and structured logging.
//!
//! Counters are atomics so a shared [`Metrics`] can be read from another
//! thread while generations run.

use crate::generation::GenerationReport;
use neuroracer_data::KillReason;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Aggregated counters over all generations of a run.
pub struct Metrics {
    generations: AtomicU64,
    ticks: AtomicU64,
    laps: AtomicU64,
    collisions: AtomicU64,
    stuck: AtomicU64,
    stalled: AtomicU64,
    spinning: AtomicU64,
    non_finite: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            laps: AtomicU64::new(0),
            collisions: AtomicU64::new(0),
            stuck: AtomicU64::new(0),
            stalled: AtomicU64::new(0),
            spinning: AtomicU64::new(0),
            non_finite: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    fn kill_counter(&self, reason: KillReason) -> &AtomicU64 {
        match reason {
            KillReason::Collision => &self.collisions,
            KillReason::Stuck => &self.stuck,
            KillReason::Stalled => &self.stalled,
            KillReason::Spinning => &self.spinning,
            KillReason::NonFinite => &self.non_finite,
        }
    }

    pub fn record_kill(&self, reason: KillReason) {
        self.kill_counter(reason).fetch_add(1, Ordering::Relaxed);
    }

    /// Folds one finished generation into the counters and logs a summary line.
    pub fn record_generation(&self, report: &GenerationReport) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        self.ticks.fetch_add(report.ticks, Ordering::Relaxed);
        let laps: usize = report.vehicles.iter().map(|v| v.laps_completed).sum();
        self.laps.fetch_add(laps as u64, Ordering::Relaxed);
        for reason in report.kills() {
            self.record_kill(reason);
        }

        tracing::info!(
            generation = report.generation,
            reason = %report.reason,
            ticks = report.ticks,
            duration_ms = report.elapsed_ms,
            best_fitness = report.best_fitness().unwrap_or(0.0),
            mean_fitness = report.mean_fitness(),
            survivors = report.survivors(),
            population = report.vehicles.len(),
            laps = laps,
            best_lap_s = report.best_lap.map(|b| b.lap.seconds),
            "Generation complete"
        );
    }

    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn laps(&self) -> u64 {
        self.laps.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn kills(&self, reason: KillReason) -> u64 {
        self.kill_counter(reason).load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
