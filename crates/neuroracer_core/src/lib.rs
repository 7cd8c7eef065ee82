//! # Neuroracer Core
//!
//! Deterministic evaluation environment for evolved race-car controllers.
//!
//! This crate contains:
//! - The drivable-surface map built from a track image
//! - A radar model casting fixed-angle distance rays
//! - Vehicle dynamics with collision, stuck and degenerate-strategy kill rules
//! - Radius-based lap timing
//! - Reward shaping for the fitness signal
//! - The per-generation evaluation loop with quit/reset signals
//!
//! Controllers and fitness slots come from outside through the
//! [`Controller`] and [`FitnessAccumulator`] traits; the core never sees a
//! genome.
//!
//! ## Example
//!
//! ```
//! use neuroracer_core::{AppConfig, Evaluator, TerminationReason, TrackSurface};
//!
//! // A straight corridor, 60 px tall.
//! let track = TrackSurface::from_fn(3000, 100, |_, y| (20..80).contains(&y));
//! let mut config = AppConfig::default();
//! config.track.start_x = 0.02;
//! config.generation.tick_budget = 120;
//!
//! let mut evaluator = Evaluator::new(config, track).unwrap();
//! let mut controllers = vec![|_: &[f64]| vec![0.0, 0.0, -1.0, 1.0]];
//! let mut fitness = vec![0.0_f64];
//! let report = evaluator.evaluate(&mut controllers, &mut fitness).unwrap();
//!
//! assert_eq!(report.reason, TerminationReason::TickBudget);
//! assert!(fitness[0] > 0.0);
//! ```

/// Tunable constants, loaded from TOML
pub mod config;
/// Seams towards the evolutionary algorithm
pub mod controller;
/// Error types
pub mod error;
/// Reward shaping
pub mod fitness;
/// Evaluation loop and termination signals
pub mod generation;
/// Lap detection
pub mod lap;
/// Counters and logging setup
pub mod metrics;
/// Distance sensors
pub mod radar;
/// Drivable-surface map
pub mod track;
/// Per-tick vehicle dynamics
pub mod vehicle;

pub use config::AppConfig;
pub use controller::{Controller, FitnessAccumulator};
pub use error::{SimError, TrackError};
pub use generation::{
    Evaluator, Generation, GenerationPhase, GenerationReport, GenerationSignals,
    TerminationReason,
};
pub use metrics::{init_logging, Metrics};
pub use track::TrackSurface;
