//! Per-tick vehicle dynamics.
//!
//! A plain [`VehicleState`] is advanced by [`step`]: control smoothing, a
//! piecewise torque/brake longitudinal model with friction, constant-velocity
//! position integration, then the collision probes, stuck detection and the
//! auxiliary kill rules. Nothing here returns an error; out-of-range commands
//! are clamped and a vehicle whose state turns non-finite is killed.

use crate::config::{KillRulesConfig, VehicleConfig};
use crate::radar::heading_vector;
use crate::track::TrackSurface;
use neuroracer_data::{ControlTargets, KillReason, Position, VehicleState};

/// What happened to a vehicle during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    /// Distance moved this tick.
    pub displacement: f64,
    /// Set when the vehicle died during this tick.
    pub killed: Option<KillReason>,
}

/// Spawns a vehicle at rest.
#[must_use]
pub fn spawn(position: Position, heading: f64, config: &VehicleConfig) -> VehicleState {
    VehicleState::new(position, heading.rem_euclid(360.0), config.max_speed)
}

/// NaN becomes 0, everything else is clamped into range.
#[must_use]
pub fn sanitize_targets(targets: ControlTargets) -> ControlTargets {
    let clean = |v: f64, lo: f64, hi: f64| if v.is_nan() { 0.0 } else { v.clamp(lo, hi) };
    ControlTargets {
        steer: clean(targets.steer, -1.0, 1.0),
        accelerator: clean(targets.accelerator, 0.0, 1.0),
        brake: clean(targets.brake, 0.0, 1.0),
    }
}

/// Engine torque at a given speed; drops above the threshold.
#[inline]
#[must_use]
pub fn torque(speed: f64, config: &VehicleConfig) -> f64 {
    if speed < config.torque_threshold {
        config.torque_low
    } else {
        config.torque_high
    }
}

/// Brake power at a given speed; softer near standstill.
#[inline]
#[must_use]
pub fn brake_power(speed: f64, config: &VehicleConfig) -> f64 {
    if speed < config.brake_low_speed {
        config.brake_power_low
    } else {
        config.brake_power
    }
}

fn smooth(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Sets the requested controls and applies smoothing toward them.
pub fn apply_controls(state: &mut VehicleState, targets: ControlTargets, config: &VehicleConfig) {
    let targets = sanitize_targets(targets);
    state.targets = targets;
    let k = config.smoothing;
    state.current = ControlTargets {
        steer: smooth(state.current.steer, targets.steer, k),
        accelerator: smooth(state.current.accelerator, targets.accelerator, k),
        brake: smooth(state.current.brake, targets.brake, k),
    };
}

/// Longitudinal model: torque minus brake, then friction, then the speed clamp.
#[must_use]
pub fn next_speed(speed: f64, current: &ControlTargets, max_speed: f64, config: &VehicleConfig) -> f64 {
    let mut next = speed + current.accelerator * torque(speed, config)
        - current.brake * brake_power(speed, config);
    next *= config.friction;
    next.clamp(0.0, max_speed)
}

/// `true` when either collision probe ends on a wall or off the map.
#[must_use]
pub fn collides(track: &TrackSurface, position: &Position, heading: f64, config: &VehicleConfig) -> bool {
    [config.collision_ray_angle, -config.collision_ray_angle]
        .iter()
        .any(|offset| {
            let (dx, dy) = heading_vector(heading + offset);
            !track.is_drivable(
                position.x + dx * config.collision_ray_length,
                position.y + dy * config.collision_ray_length,
            )
        })
}

/// Advances one live vehicle by one tick. `tick` is only used to timestamp a kill.
pub fn step(
    state: &mut VehicleState,
    targets: ControlTargets,
    track: &TrackSurface,
    vehicle: &VehicleConfig,
    rules: &KillRulesConfig,
    tick: u64,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    if !state.alive {
        return outcome;
    }

    apply_controls(state, targets, vehicle);

    state.speed = next_speed(state.speed, &state.current, state.max_speed, vehicle);
    state.heading = (state.heading - vehicle.rotation_velocity * state.current.steer).rem_euclid(360.0);

    let previous = state.position;
    let (dx, dy) = heading_vector(state.heading);
    state.position.x += dx * state.speed;
    state.position.y += dy * state.speed;

    if !state.speed.is_finite() || !state.heading.is_finite() || !state.position.is_finite() {
        state.position = previous;
        state.speed = 0.0;
        state.kill(KillReason::NonFinite, tick);
        outcome.killed = Some(KillReason::NonFinite);
        return outcome;
    }

    let displacement = previous.distance(&state.position);
    outcome.displacement = displacement;
    state.distance_travelled += displacement;
    state.frames_alive += 1;

    if collides(track, &state.position, state.heading, vehicle) {
        state.kill(KillReason::Collision, tick);
        outcome.killed = Some(KillReason::Collision);
        return outcome;
    }

    if let Some(reason) = check_kill_rules(state, displacement, rules) {
        state.kill(reason, tick);
        outcome.killed = Some(reason);
    }

    outcome
}

/// Updates the stuck/stall/spin counters and reports the first rule that fires.
pub fn check_kill_rules(
    state: &mut VehicleState,
    displacement: f64,
    rules: &KillRulesConfig,
) -> Option<KillReason> {
    if displacement < rules.stuck_displacement {
        state.stuck_frames += 1;
    } else {
        state.stuck_frames = 0;
    }
    if state.stuck_frames > rules.stuck_frames {
        return Some(KillReason::Stuck);
    }

    if rules.stall_enabled {
        if state.frames_alive > rules.stall_grace_ticks && state.speed < rules.stall_speed {
            state.stall_frames += 1;
        } else {
            state.stall_frames = 0;
        }
        if state.stall_frames > rules.stall_frames {
            return Some(KillReason::Stalled);
        }
    }

    if rules.spin_enabled {
        if state.current.steer.abs() > rules.spin_steer && state.speed < rules.spin_speed {
            state.spin_frames += 1;
        } else {
            state.spin_frames = 0;
        }
        if state.spin_frames > rules.spin_frames {
            return Some(KillReason::Spinning);
        }
    }

    None
}
