//! Seams towards the evolutionary algorithm.
//!
//! The core never looks inside a genome. It only needs something that maps
//! a sensor vector to an output vector, and a fitness slot it can zero,
//! read and add to.

use neuroracer_data::{ControlOutputs, ControlTargets, OutputRange};

/// Maps a sensor vector to raw outputs: steer-left, steer-right, brake, accelerator.
///
/// Shorter outputs are padded with zeros and extras are ignored.
pub trait Controller {
    fn activate(&mut self, inputs: &[f64]) -> Vec<f64>;
}

impl<F> Controller for F
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    fn activate(&mut self, inputs: &[f64]) -> Vec<f64> {
        self(inputs)
    }
}

/// External fitness slot, owned by the evolutionary algorithm.
pub trait FitnessAccumulator {
    fn get(&self) -> f64;
    fn add(&mut self, delta: f64);

    fn reset(&mut self) {
        let current = self.get();
        self.add(-current);
    }
}

impl FitnessAccumulator for f64 {
    fn get(&self) -> f64 {
        *self
    }

    fn add(&mut self, delta: f64) {
        *self += delta;
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

/// Queries a controller and turns its raw outputs into control targets.
pub fn drive<C: Controller + ?Sized>(
    controller: &mut C,
    inputs: &[f64],
    range: OutputRange,
    dead_zone: f64,
) -> ControlTargets {
    let raw = controller.activate(inputs);
    ControlOutputs::from_raw(&raw).into_targets(range, dead_zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Boxed(f64);

    impl FitnessAccumulator for Boxed {
        fn get(&self) -> f64 {
            self.0
        }

        fn add(&mut self, delta: f64) {
            self.0 += delta;
        }
    }

    #[test]
    fn test_closure_is_a_controller() {
        let mut calls = 0;
        let mut c = |inputs: &[f64]| {
            calls += 1;
            vec![0.0, inputs[0], -1.0, 1.0]
        };
        let t = drive(&mut c, &[0.7], OutputRange::Tanh, 0.2);
        assert_eq!(t, ControlTargets::new(0.7, 1.0, 0.0));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_empty_output_is_padded() {
        let mut c = |_: &[f64]| Vec::<f64>::new();
        let t = drive(&mut c, &[], OutputRange::Tanh, 0.2);
        assert_eq!(t, ControlTargets::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn test_default_reset_zeroes() {
        let mut slot = Boxed(12.5);
        slot.reset();
        assert_eq!(slot.get(), 0.0);

        let mut plain = 3.0_f64;
        plain.add(1.5);
        assert_eq!(plain.get(), 4.5);
        plain.reset();
        assert_eq!(plain, 0.0);
    }
}
