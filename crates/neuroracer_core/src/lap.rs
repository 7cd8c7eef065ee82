//! Start-line departure and return detection.

use neuroracer_data::{LapRecord, LapState, Position};

/// Radius-based lap detector for one start position.
///
/// A lap opens when the vehicle first leaves the circle around the start
/// point and closes when it comes back inside. Returns that happen sooner
/// than `min_lap_ticks` after the lap opened are ignored, which keeps a
/// vehicle hovering on the circle's edge from registering laps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapTimer {
    start: Position,
    radius: f64,
    min_lap_ticks: u64,
    tick_rate: u32,
}

impl LapTimer {
    #[must_use]
    pub fn new(start: Position, radius: f64, min_lap_ticks: u64, tick_rate: u32) -> Self {
        Self {
            start,
            radius,
            min_lap_ticks,
            tick_rate,
        }
    }

    #[must_use]
    pub fn start(&self) -> Position {
        self.start
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Lap duration in simulated seconds.
    #[must_use]
    pub fn seconds(&self, ticks: u64) -> f64 {
        ticks as f64 / f64::from(self.tick_rate.max(1))
    }

    /// Advances the lap state for a vehicle now at `position`.
    ///
    /// Returns the lap that was completed on this tick, if any.
    pub fn update(&self, state: &mut LapState, position: &Position, tick: u64) -> Option<LapRecord> {
        let away = self.start.distance(position);
        if !state.in_progress {
            if away > self.radius {
                state.in_progress = true;
                state.started_at = tick;
            }
            return None;
        }

        if away >= self.radius {
            return None;
        }
        let ticks = tick.saturating_sub(state.started_at);
        if ticks < self.min_lap_ticks {
            return None;
        }

        let record = LapRecord {
            ticks,
            seconds: self.seconds(ticks),
            completed_at: tick,
        };
        state.in_progress = false;
        state.history.push(record);
        if state.personal_best.map_or(true, |best| ticks < best.ticks) {
            state.personal_best = Some(record);
        }
        Some(record)
    }
}
