pub use neuroracer_core::{
    AppConfig, Controller, Evaluator, FitnessAccumulator, GenerationPhase, GenerationReport,
    GenerationSignals, SimError, TerminationReason, TrackError, TrackSurface,
};
pub use neuroracer_data::{ControlTargets, KillReason, LapRecord, Position, VehicleState, VehicleSummary};

pub mod config {
    pub use neuroracer_core::config::*;
}
pub mod generation {
    pub use neuroracer_core::generation::*;
}
pub mod metrics {
    pub use neuroracer_core::metrics::*;
}
pub mod radar {
    pub use neuroracer_core::radar::*;
}
pub mod track {
    pub use neuroracer_core::track::*;
}
pub mod vehicle {
    pub use neuroracer_core::vehicle::*;
}

pub use config::EvolutionConfig;
