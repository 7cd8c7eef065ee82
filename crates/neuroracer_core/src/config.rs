//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every physics, sensing, reward and termination
//! constant lives here so that tests can drive edge cases deterministically.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults; sections and fields may be omitted)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [vehicle]
//! max_speed = 12.0
//! rotation_velocity = 5.0
//!
//! [radar]
//! angles = [-60.0, -30.0, 0.0, 30.0, 60.0]
//! max_length = 300
//!
//! [generation]
//! tick_budget = 3600
//! launch_ticks = 30
//! ```

use anyhow::Context;
use neuroracer_data::{OutputRange, MAX_SENSOR_RAYS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Map interpretation and start/finish line placement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackConfig {
    /// RGBA colour that marks non-drivable terrain.
    pub boundary_color: [u8; 4],
    /// Spawn position as a fraction of the map width.
    pub start_x: f64,
    /// Spawn position as a fraction of the map height.
    pub start_y: f64,
    /// Degrees, 0 = east, counter-clockwise on screen.
    pub start_heading: f64,
    /// Start/finish radius in pixels at `reference_width`.
    pub lap_radius: f64,
    /// Map width the pixel constants were tuned for.
    pub reference_width: f64,
    /// Returns to the start faster than this are ignored.
    pub min_lap_ticks: u64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            boundary_color: [255, 255, 255, 255],
            start_x: 0.5,
            start_y: 0.5,
            start_heading: 0.0,
            lap_radius: 100.0,
            reference_width: 1920.0,
            min_lap_ticks: 120,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RadarConfig {
    /// Ray angles relative to the heading, degrees.
    pub angles: Vec<f64>,
    /// Maximum ray length in pixels (unit steps).
    pub max_length: u32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            angles: vec![-60.0, -30.0, 0.0, 30.0, 60.0],
            max_length: 300,
        }
    }
}

/// Longitudinal and lateral vehicle model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VehicleConfig {
    pub max_speed: f64,
    /// Torque below `torque_threshold`.
    pub torque_low: f64,
    /// Torque at or above `torque_threshold`.
    pub torque_high: f64,
    pub torque_threshold: f64,
    pub brake_power: f64,
    /// Brake power below `brake_low_speed`, keeps the car from overshooting zero.
    pub brake_power_low: f64,
    pub brake_low_speed: f64,
    /// Multiplicative per-tick speed factor, `(0, 1]`.
    pub friction: f64,
    /// Degrees of heading change per tick at full steering.
    pub rotation_velocity: f64,
    /// `1.0` applies targets instantly, smaller values model actuator lag.
    pub smoothing: f64,
    pub collision_ray_length: f64,
    pub collision_ray_angle: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            torque_low: 0.3,
            torque_high: 0.15,
            torque_threshold: 6.0,
            brake_power: 0.5,
            brake_power_low: 0.1,
            brake_low_speed: 1.0,
            friction: 0.99,
            rotation_velocity: 4.0,
            smoothing: 1.0,
            collision_ray_length: 20.0,
            collision_ray_angle: 18.0,
        }
    }
}

/// Stuck detection and the heuristic anti-degenerate-strategy rules.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KillRulesConfig {
    /// Per-tick displacement below this counts as a stuck frame.
    pub stuck_displacement: f64,
    /// The vehicle dies once its stuck counter exceeds this.
    pub stuck_frames: u32,
    pub stall_enabled: bool,
    /// Ticks alive before the stall rule starts counting.
    pub stall_grace_ticks: u64,
    pub stall_speed: f64,
    pub stall_frames: u32,
    pub spin_enabled: bool,
    pub spin_steer: f64,
    pub spin_speed: f64,
    pub spin_frames: u32,
}

impl Default for KillRulesConfig {
    fn default() -> Self {
        Self {
            stuck_displacement: 0.5,
            stuck_frames: 120,
            stall_enabled: true,
            stall_grace_ticks: 300,
            stall_speed: 0.5,
            stall_frames: 180,
            spin_enabled: true,
            spin_steer: 0.8,
            spin_speed: 2.0,
            spin_frames: 240,
        }
    }
}

/// Reward shaping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FitnessConfig {
    /// Reward per tick per unit of speed.
    pub speed_weight: f64,
    /// Fraction of `max_speed` above which the high-speed bonus applies.
    pub high_speed_fraction: f64,
    /// Weight on the squared excess over the high-speed threshold.
    pub high_speed_weight: f64,
    pub survival_bonus: f64,
    pub lap_flat_bonus: f64,
    /// `K` in `K / lap_seconds`.
    pub lap_time_constant: f64,
    /// Subtracted when a vehicle dies stuck, stalled or spinning.
    pub degenerate_kill_penalty: f64,
    pub collision_penalty: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            speed_weight: 0.1,
            high_speed_fraction: 0.8,
            high_speed_weight: 0.05,
            survival_bonus: 0.0,
            lap_flat_bonus: 100.0,
            lap_time_constant: 1000.0,
            degenerate_kill_penalty: 50.0,
            collision_penalty: 0.0,
        }
    }
}

/// Generation loop timing and controller interpretation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Assumed simulation rate, used to convert ticks to seconds.
    pub tick_rate: u32,
    pub tick_budget: u64,
    /// Off by default: a wall-clock cut-off makes runs non-reproducible.
    pub wall_clock_budget_ms: Option<u64>,
    /// Ticks after spawn that run at full throttle without the controller.
    pub launch_ticks: u64,
    pub steer_dead_zone: f64,
    pub output_range: OutputRange,
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            tick_budget: 1800,
            wall_clock_budget_ms: None,
            launch_ticks: 30,
            steer_dead_zone: 0.2,
            output_range: OutputRange::Tanh,
            parallel: true,
        }
    }
}

/// Parameters for the bundled neuro-evolution collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub seed: Option<u64>,
    pub mutation_rate: f32,
    pub mutation_amount: f32,
    pub add_connection_rate: f32,
    pub split_connection_rate: f32,
    pub elite_count: usize,
    pub tournament_size: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 50,
            seed: None,
            mutation_rate: 0.8,
            mutation_amount: 0.5,
            add_connection_rate: 0.1,
            split_connection_rate: 0.03,
            elite_count: 2,
            tournament_size: 3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub track: TrackConfig,
    pub radar: RadarConfig,
    pub vehicle: VehicleConfig,
    pub kill_rules: KillRulesConfig,
    pub fitness: FitnessConfig,
    pub generation: GenerationConfig,
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Track
        anyhow::ensure!(
            (0.0..1.0).contains(&self.track.start_x) && (0.0..1.0).contains(&self.track.start_y),
            "Start position must be given as fractions in [0.0, 1.0)"
        );
        anyhow::ensure!(
            self.track.start_heading.is_finite(),
            "Start heading must be finite"
        );
        anyhow::ensure!(self.track.lap_radius > 0.0, "Lap radius must be positive");
        anyhow::ensure!(
            self.track.reference_width > 0.0,
            "Reference width must be positive"
        );

        // Radar
        anyhow::ensure!(
            !self.radar.angles.is_empty(),
            "Radar needs at least one ray angle"
        );
        anyhow::ensure!(
            self.radar.angles.len() <= MAX_SENSOR_RAYS,
            "Too many radar rays (max {MAX_SENSOR_RAYS})"
        );
        anyhow::ensure!(
            self.radar.angles.iter().all(|a| a.is_finite()),
            "Radar angles must be finite"
        );
        anyhow::ensure!(self.radar.max_length > 0, "Radar length must be positive");

        // Vehicle
        anyhow::ensure!(self.vehicle.max_speed > 0.0, "Max speed must be positive");
        anyhow::ensure!(
            self.vehicle.torque_low >= 0.0 && self.vehicle.torque_high >= 0.0,
            "Torque must be non-negative"
        );
        anyhow::ensure!(
            self.vehicle.brake_power >= 0.0 && self.vehicle.brake_power_low >= 0.0,
            "Brake power must be non-negative"
        );
        anyhow::ensure!(
            self.vehicle.friction > 0.0 && self.vehicle.friction <= 1.0,
            "Friction must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.vehicle.smoothing > 0.0 && self.vehicle.smoothing <= 1.0,
            "Control smoothing must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.vehicle.rotation_velocity >= 0.0,
            "Rotation velocity must be non-negative"
        );
        anyhow::ensure!(
            self.vehicle.collision_ray_length > 0.0,
            "Collision ray length must be positive"
        );
        anyhow::ensure!(
            self.vehicle.collision_ray_angle.is_finite()
                && self.vehicle.torque_threshold.is_finite()
                && self.vehicle.brake_low_speed.is_finite(),
            "Collision ray angle and speed thresholds must be finite"
        );

        // Kill rules
        anyhow::ensure!(
            self.kill_rules.stuck_displacement >= 0.0,
            "Stuck displacement threshold must be non-negative"
        );
        anyhow::ensure!(
            self.kill_rules.stuck_frames > 0,
            "Stuck frame limit must be positive"
        );

        // Fitness
        anyhow::ensure!(
            self.fitness.speed_weight >= 0.0,
            "Speed weight must be non-negative"
        );
        anyhow::ensure!(
            self.fitness.lap_time_constant >= 0.0 && self.fitness.lap_flat_bonus >= 0.0,
            "Lap bonuses must be non-negative"
        );
        anyhow::ensure!(
            self.fitness.degenerate_kill_penalty >= 0.0 && self.fitness.collision_penalty >= 0.0,
            "Penalties are given as non-negative magnitudes"
        );

        anyhow::ensure!(
            self.fitness.high_speed_fraction.is_finite()
                && self.fitness.high_speed_weight.is_finite()
                && self.fitness.survival_bonus.is_finite(),
            "High-speed and survival rewards must be finite"
        );

        // Generation
        anyhow::ensure!(self.generation.tick_rate > 0, "Tick rate must be positive");
        anyhow::ensure!(
            self.generation.tick_budget > 0,
            "Tick budget must be positive"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.generation.steer_dead_zone),
            "Steering dead-zone must be in [0.0, 1.0)"
        );

        // Evolution
        anyhow::ensure!(
            self.evolution.population_size > 0,
            "Population size must be positive"
        );
        anyhow::ensure!(
            self.evolution.elite_count <= self.evolution.population_size,
            "Elite count cannot exceed the population size"
        );
        anyhow::ensure!(
            self.evolution.tournament_size > 0,
            "Tournament size must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Hash of everything that changes simulated outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.track).as_bytes());
        hasher.update(format!("{:?}", self.radar).as_bytes());
        hasher.update(format!("{:?}", self.vehicle).as_bytes());
        hasher.update(format!("{:?}", self.kill_rules).as_bytes());
        hasher.update(format!("{:?}", self.fitness).as_bytes());
        hasher.update(format!("{:?}", self.generation).as_bytes());
        hex::encode(hasher.finalize())
    }
}
