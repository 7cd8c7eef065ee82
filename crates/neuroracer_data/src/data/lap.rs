use serde::{Deserialize, Serialize};

/// A completed lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub ticks: u64,
    pub seconds: f64,
    /// Tick at which the lap was completed.
    pub completed_at: u64,
}

/// Per-vehicle lap bookkeeping, advanced by the lap timer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LapState {
    pub in_progress: bool,
    pub started_at: u64,
    pub history: Vec<LapRecord>,
    pub personal_best: Option<LapRecord>,
}

impl LapState {
    #[must_use]
    pub fn laps_completed(&self) -> usize {
        self.history.len()
    }
}
