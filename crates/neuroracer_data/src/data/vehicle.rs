use super::control::ControlTargets;
use super::lap::{LapRecord, LapState};
use serde::{Deserialize, Serialize};

/// Continuous position in map pixels. `y` grows downwards, as on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Why a vehicle stopped taking part in the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillReason {
    /// One of the collision probes left the drivable surface.
    Collision,
    /// Displacement stayed under the movement threshold for too many ticks.
    Stuck,
    /// Speed stayed near zero long after launch.
    Stalled,
    /// Steering stayed saturated while the car barely moved.
    Spinning,
    /// Speed, heading or position became NaN/Inf.
    NonFinite,
}

impl KillReason {
    /// Kills caused by a learned degenerate strategy rather than by driving off the track.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        matches!(
            self,
            KillReason::Stuck | KillReason::Stalled | KillReason::Spinning
        )
    }
}

/// Physical and bookkeeping state of one simulated car.
///
/// Created at generation start (one per genome) and dropped when the
/// generation ends. Once `alive` is false the state is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Position,
    /// Degrees, kept in `[0, 360)`.
    pub heading: f64,
    pub speed: f64,
    pub max_speed: f64,
    /// Commands requested by the controller this tick.
    pub targets: ControlTargets,
    /// Smoothed commands actually applied to the car.
    pub current: ControlTargets,
    pub alive: bool,
    pub killed_by: Option<KillReason>,
    pub died_at_tick: Option<u64>,
    pub distance_travelled: f64,
    pub frames_alive: u64,
    pub stuck_frames: u32,
    pub stall_frames: u32,
    pub spin_frames: u32,
    pub lap: LapState,
}

impl VehicleState {
    #[must_use]
    pub fn new(position: Position, heading: f64, max_speed: f64) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            max_speed,
            targets: ControlTargets::default(),
            current: ControlTargets::default(),
            alive: true,
            killed_by: None,
            died_at_tick: None,
            distance_travelled: 0.0,
            frames_alive: 0,
            stuck_frames: 0,
            stall_frames: 0,
            spin_frames: 0,
            lap: LapState::default(),
        }
    }

    /// Marks the vehicle dead. Only the first kill is recorded.
    pub fn kill(&mut self, reason: KillReason, tick: u64) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.killed_by = Some(reason);
        self.died_at_tick = Some(tick);
    }

    #[must_use]
    pub fn best_lap(&self) -> Option<&LapRecord> {
        self.lap.personal_best.as_ref()
    }
}

/// End-of-generation snapshot of one vehicle, used for reports and leaderboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub index: usize,
    pub alive: bool,
    pub killed_by: Option<KillReason>,
    pub died_at_tick: Option<u64>,
    pub distance_travelled: f64,
    pub laps_completed: usize,
    pub best_lap: Option<LapRecord>,
    pub final_position: Position,
    pub fitness: f64,
}

impl VehicleSummary {
    #[must_use]
    pub fn from_state(index: usize, state: &VehicleState, fitness: f64) -> Self {
        Self {
            index,
            alive: state.alive,
            killed_by: state.killed_by,
            died_at_tick: state.died_at_tick,
            distance_travelled: state.distance_travelled,
            laps_completed: state.lap.history.len(),
            best_lap: state.lap.personal_best,
            final_position: state.position,
            fitness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_is_recorded_once() {
        let mut v = VehicleState::new(Position::new(1.0, 2.0), 0.0, 10.0);
        v.kill(KillReason::Stuck, 5);
        v.kill(KillReason::Collision, 9);
        assert!(!v.alive);
        assert_eq!(v.killed_by, Some(KillReason::Stuck));
        assert_eq!(v.died_at_tick, Some(5));
    }

    #[test]
    fn test_degenerate_reasons() {
        assert!(KillReason::Stuck.is_degenerate());
        assert!(KillReason::Spinning.is_degenerate());
        assert!(!KillReason::Collision.is_degenerate());
        assert!(!KillReason::NonFinite.is_degenerate());
    }

    #[test]
    fn test_summary_serializes() {
        let v = VehicleState::new(Position::new(3.0, 4.0), 90.0, 10.0);
        let summary = VehicleSummary::from_state(2, &v, 1.5);
        let json = serde_json::to_string(&summary).expect("serialize summary");
        assert!(json.contains("\"index\":2"));
        assert!(json.contains("\"laps_completed\":0"));
    }
}
