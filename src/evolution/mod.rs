//! Reference neuro-evolution collaborator.
//!
//! A compact NEAT-style genome ([`Brain`]) and a [`Population`] with elitism
//! and tournament selection. The simulation core only sees these through the
//! `Controller` trait and a slice of `f64` fitness slots.

pub mod brain;
pub mod population;

pub use brain::Brain;
pub use population::Population;

/// Outputs every controller must produce: steer-left, steer-right, brake, accelerator.
pub const CONTROL_OUTPUTS: usize = 4;
