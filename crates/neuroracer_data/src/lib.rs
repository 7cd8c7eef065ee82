//! Plain data shared by the neuroracer simulation core and its collaborators.
//!
//! Nothing in here simulates anything; the types are moved across the
//! controller boundary, written into generation reports, and mutated by the
//! free functions in `neuroracer_core`.

pub mod data;

pub use data::control::{ControlOutputs, ControlTargets, OutputRange};
pub use data::lap::{LapRecord, LapState};
pub use data::sensor::{SensorRay, SensorReading, MAX_SENSOR_RAYS};
pub use data::vehicle::{KillReason, Position, VehicleState, VehicleSummary};
