pub mod macros;

use neuroracer_lib::model::{AppConfig, Controller, Evaluator, GenerationReport, TrackSurface};

/// Ring track: centre (400, 400), drivable between radius 180 and 330.
pub const RING_SIZE: u32 = 800;
pub const RING_START_X: f64 = 655.0;

#[allow(dead_code)]
pub fn ring_track() -> TrackSurface {
    TrackSurface::from_fn(RING_SIZE, RING_SIZE, |x, y| {
        let dx = f64::from(x) - 400.0;
        let dy = f64::from(y) - 400.0;
        let r = (dx * dx + dy * dy).sqrt();
        (180.0..330.0).contains(&r)
    })
}

/// Horizontal corridor `width` pixels long, drivable for `20 <= y < 80`.
#[allow(dead_code)]
pub fn corridor(width: u32) -> TrackSurface {
    TrackSurface::from_fn(width, 100, |_, y| (20..80).contains(&y))
}

/// Deterministic, non-learning drivers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(dead_code)]
pub enum ScriptedDriver {
    /// Steers away from the closer side wall at full throttle.
    Centering { gain: f64 },
    /// Same steering, barely touching the accelerator.
    Idler { gain: f64 },
    /// Full brake, no throttle, from tick 0.
    Braker,
    /// Straight ahead, full throttle.
    FullThrottle,
}

impl ScriptedDriver {
    fn steer(gain: f64, inputs: &[f64]) -> f64 {
        let at = |i: usize| inputs.get(i).copied().unwrap_or(0.0);
        let left = at(4) + at(3);
        let right = at(0) + at(1);
        (gain * (left - right)).clamp(-1.0, 1.0)
    }
}

impl Controller for ScriptedDriver {
    fn activate(&mut self, inputs: &[f64]) -> Vec<f64> {
        match *self {
            ScriptedDriver::Centering { gain } => {
                let st = Self::steer(gain, inputs);
                vec![(-st).max(0.0), st.max(0.0), -1.0, 1.0]
            }
            ScriptedDriver::Idler { gain } => {
                let st = Self::steer(gain, inputs);
                vec![(-st).max(0.0), st.max(0.0), -1.0, -0.9]
            }
            ScriptedDriver::Braker => vec![0.0, 0.0, 1.0, -1.0],
            ScriptedDriver::FullThrottle => vec![0.0, 0.0, -1.0, 1.0],
        }
    }
}

/// Builds configs for the test tracks.
#[allow(dead_code)]
pub struct ConfigBuilder {
    config: AppConfig,
}

#[allow(dead_code)]
impl ConfigBuilder {
    /// Ring start on the right-hand side heading up, lap radius 60 px, no launch phase.
    pub fn ring() -> Self {
        let mut config = AppConfig::default();
        config.track.start_x = RING_START_X / f64::from(RING_SIZE);
        config.track.start_y = 0.5;
        config.track.start_heading = 90.0;
        config.track.reference_width = f64::from(RING_SIZE);
        config.track.lap_radius = 60.0;
        config.generation.launch_ticks = 0;
        config.generation.tick_budget = 900;
        Self { config }
    }

    /// Corridor start at (50, 50) heading east.
    pub fn corridor(width: u32) -> Self {
        let mut config = AppConfig::default();
        config.track.start_x = 50.0 / f64::from(width);
        config.track.start_y = 0.5;
        config.track.start_heading = 0.0;
        config.generation.launch_ticks = 0;
        Self { config }
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn ticks(mut self, budget: u64) -> Self {
        self.config.generation.tick_budget = budget;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.config.generation.parallel = false;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

/// Runs a single generation and returns the report with the final fitness.
#[allow(dead_code)]
pub fn run_generation(
    config: AppConfig,
    track: TrackSurface,
    drivers: &mut [ScriptedDriver],
) -> GenerationReport {
    let mut evaluator = Evaluator::new(config, track).expect("test config is valid");
    let mut fitness = vec![0.0_f64; drivers.len()];
    evaluator
        .evaluate(drivers, &mut fitness)
        .expect("generation runs to completion")
}
