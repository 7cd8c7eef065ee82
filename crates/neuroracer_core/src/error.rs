//! Error types for the simulation core.
//!
//! Only load-time and entry-point failures are errors. Nothing inside a tick
//! returns one: bad controller values are clamped and misbehaving vehicles
//! are killed instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a map asset into a [`crate::track::TrackSurface`].
#[derive(Error, Debug)]
pub enum TrackError {
    /// The map file does not exist
    #[error("Track asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not a decodable image
    #[error("Failed to decode track asset {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Zero-sized maps cannot hold a vehicle
    #[error("Track surface is empty ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Errors surfaced by the generation entry points.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Population mismatch: {controllers} controllers for {accumulators} fitness accumulators")]
    PopulationMismatch {
        controllers: usize,
        accumulators: usize,
    },
}

/// Result type alias for simulation entry points.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
