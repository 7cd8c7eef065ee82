//! Reward shaping.
//!
//! Per-tick speed reward with a superlinear bonus above a speed threshold,
//! a per-lap bonus that pays more for faster laps (`flat + K / seconds`),
//! and penalties for vehicles removed by the degenerate-strategy kill rules.

use crate::config::FitnessConfig;
use neuroracer_data::{KillReason, LapRecord, VehicleState};

/// Zeroes anything that is not a finite number.
#[inline]
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitnessPolicy {
    config: FitnessConfig,
}

impl FitnessPolicy {
    #[must_use]
    pub fn new(config: FitnessConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    /// Reward for one tick of a vehicle that is still alive after its step.
    #[must_use]
    pub fn tick_reward(&self, state: &VehicleState) -> f64 {
        if !state.alive {
            return 0.0;
        }
        let c = &self.config;
        let speed = state.speed;
        let mut reward = speed * c.speed_weight + c.survival_bonus;
        let threshold = state.max_speed * c.high_speed_fraction;
        if speed > threshold {
            let excess = speed - threshold;
            reward += excess * excess * c.high_speed_weight;
        }
        finite_or_zero(reward)
    }

    /// Bonus for a completed lap.
    #[must_use]
    pub fn lap_bonus(&self, lap: &LapRecord) -> f64 {
        if !(lap.seconds > 0.0) {
            return finite_or_zero(self.config.lap_flat_bonus);
        }
        finite_or_zero(self.config.lap_flat_bonus + self.config.lap_time_constant / lap.seconds)
    }

    /// Reward delta (zero or negative) for a vehicle that was just killed.
    #[must_use]
    pub fn kill_penalty(&self, reason: KillReason) -> f64 {
        let penalty = match reason {
            KillReason::Collision => self.config.collision_penalty,
            reason if reason.is_degenerate() => self.config.degenerate_kill_penalty,
            _ => 0.0,
        };
        -finite_or_zero(penalty)
    }
}

impl Default for FitnessPolicy {
    fn default() -> Self {
        Self::new(FitnessConfig::default())
    }
}
