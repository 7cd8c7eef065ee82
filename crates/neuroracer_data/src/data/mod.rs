//! Core data structures for the neuroracer simulation.

pub mod control;
pub mod lap;
pub mod sensor;
pub mod vehicle;
