//! # Neuroracer
//!
//! Evolves neural driving controllers on 2D race tracks. The simulation
//! itself lives in `neuroracer_core`; this crate adds the reference
//! neuro-evolution loop and the command-line application around it.

pub mod app;
pub mod evolution;
pub mod model;
