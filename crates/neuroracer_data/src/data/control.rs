use serde::{Deserialize, Serialize};

/// Steering / accelerator / brake triple.
///
/// Used both for the controller's requested targets and for the smoothed
/// values the dynamics actually apply.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlTargets {
    /// `-1.0` full left, `1.0` full right.
    pub steer: f64,
    /// `[0, 1]`
    pub accelerator: f64,
    /// `[0, 1]`
    pub brake: f64,
}

impl ControlTargets {
    #[must_use]
    pub fn new(steer: f64, accelerator: f64, brake: f64) -> Self {
        Self {
            steer,
            accelerator,
            brake,
        }
    }

    /// Full throttle, straight ahead. Used during the launch phase.
    #[must_use]
    pub fn launch() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }
}

/// Native value range of a controller's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputRange {
    /// `[-1, 1]`, e.g. tanh activations.
    #[default]
    Tanh,
    /// `[0, 1]`, e.g. sigmoid activations.
    Sigmoid,
}

impl OutputRange {
    /// Maps a raw output into `[0, 1]`.
    #[must_use]
    pub fn to_unit(self, raw: f64) -> f64 {
        let unit = match self {
            OutputRange::Tanh => (raw + 1.0) * 0.5,
            OutputRange::Sigmoid => raw,
        };
        if unit.is_nan() {
            0.0
        } else {
            unit.clamp(0.0, 1.0)
        }
    }
}

/// The four outputs the simulation reads from a controller, in order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlOutputs {
    pub steer_left: f64,
    pub steer_right: f64,
    pub brake: f64,
    pub accelerator: f64,
}

impl ControlOutputs {
    /// Reads the first four values; missing ones are zero, extras are ignored,
    /// NaN becomes zero.
    #[must_use]
    pub fn from_raw(raw: &[f64]) -> Self {
        let at = |i: usize| match raw.get(i) {
            Some(v) if !v.is_nan() => *v,
            _ => 0.0,
        };
        Self {
            steer_left: at(0),
            steer_right: at(1),
            brake: at(2),
            accelerator: at(3),
        }
    }

    /// Combines the left/right intents into one steering value and rescales
    /// brake and accelerator into `[0, 1]`.
    ///
    /// Steering magnitudes below `dead_zone` are treated as zero.
    #[must_use]
    pub fn into_targets(self, range: OutputRange, dead_zone: f64) -> ControlTargets {
        let mut steer = (self.steer_right - self.steer_left).clamp(-1.0, 1.0);
        if steer.is_nan() || steer.abs() < dead_zone {
            steer = 0.0;
        }
        ControlTargets {
            steer,
            accelerator: range.to_unit(self.accelerator),
            brake: range.to_unit(self.brake),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_pads_short_output() {
        let out = ControlOutputs::from_raw(&[0.5]);
        assert_eq!(out.steer_left, 0.5);
        assert_eq!(out.steer_right, 0.0);
        assert_eq!(out.brake, 0.0);
        assert_eq!(out.accelerator, 0.0);
    }

    #[test]
    fn test_from_raw_ignores_extras_and_nan() {
        let out = ControlOutputs::from_raw(&[f64::NAN, 0.1, 0.2, 0.3, 9.0, 9.0]);
        assert_eq!(out.steer_left, 0.0);
        assert_eq!(out.accelerator, 0.3);
    }

    #[test]
    fn test_output_range_rescale() {
        assert_eq!(OutputRange::Tanh.to_unit(-1.0), 0.0);
        assert_eq!(OutputRange::Tanh.to_unit(1.0), 1.0);
        assert_eq!(OutputRange::Tanh.to_unit(0.0), 0.5);
        assert_eq!(OutputRange::Sigmoid.to_unit(0.25), 0.25);
        assert_eq!(OutputRange::Sigmoid.to_unit(7.0), 1.0);
        assert_eq!(OutputRange::Tanh.to_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_dead_zone_suppresses_jitter() {
        let out = ControlOutputs::from_raw(&[0.1, 0.25, -1.0, 1.0]);
        let t = out.into_targets(OutputRange::Tanh, 0.2);
        assert_eq!(t.steer, 0.0);
        assert_eq!(t.brake, 0.0);
        assert_eq!(t.accelerator, 1.0);
    }

    #[test]
    fn test_differential_steering() {
        let t = ControlOutputs::from_raw(&[0.0, 0.9, 0.0, 0.0]).into_targets(OutputRange::Tanh, 0.2);
        assert_eq!(t.steer, 0.9);
        let t = ControlOutputs::from_raw(&[1.0, -1.0, 0.0, 0.0]).into_targets(OutputRange::Tanh, 0.2);
        assert_eq!(t.steer, -1.0);
    }
}
