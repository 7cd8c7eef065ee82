use neuroracer_lib::model::config::{KillRulesConfig, VehicleConfig};
use neuroracer_lib::model::radar::closeness;
use neuroracer_lib::model::vehicle::{spawn, step};
use neuroracer_lib::model::{ControlTargets, Position, TrackSurface};
use neuroracer_data::{ControlOutputs, OutputRange};
use proptest::prelude::*;

prop_compose! {
    fn arb_targets()(
        steer in -3.0f64..3.0,
        accelerator in -2.0f64..2.0,
        brake in -2.0f64..2.0
    ) -> ControlTargets {
        ControlTargets::new(steer, accelerator, brake)
    }
}

fn open_track() -> TrackSurface {
    TrackSurface::from_fn(2000, 2000, |_, _| true)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_speed_stays_clamped(
        commands in prop::collection::vec(arb_targets(), 1..60),
        heading in 0.0f64..360.0
    ) {
        let track = open_track();
        let config = VehicleConfig::default();
        let rules = KillRulesConfig::default();
        let mut state = spawn(Position::new(1000.0, 1000.0), heading, &config);

        for (tick, targets) in commands.into_iter().enumerate() {
            step(&mut state, targets, &track, &config, &rules, tick as u64 + 1);
            prop_assert!(state.speed >= 0.0 && state.speed <= config.max_speed,
                "speed {} out of range", state.speed);
            prop_assert!((0.0..=360.0).contains(&state.heading), "heading {}", state.heading);
        }
    }

    #[test]
    fn test_distance_never_decreases(
        commands in prop::collection::vec(arb_targets(), 1..60)
    ) {
        let track = open_track();
        let config = VehicleConfig::default();
        let rules = KillRulesConfig::default();
        let mut state = spawn(Position::new(1000.0, 1000.0), 0.0, &config);

        let mut last = 0.0;
        for (tick, targets) in commands.into_iter().enumerate() {
            step(&mut state, targets, &track, &config, &rules, tick as u64 + 1);
            prop_assert!(state.distance_travelled >= last);
            last = state.distance_travelled;
        }
    }

    #[test]
    fn test_closeness_in_unit_interval(distance in 0u32..1000, max_length in 0u32..600) {
        let c = closeness(distance, max_length);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn test_drivability_lookup_is_pure(x in -50.0f64..250.0, y in -50.0f64..250.0) {
        let track = TrackSurface::from_fn(200, 200, |x, y| (x + y) % 3 != 0);
        let first = track.is_drivable(x, y);
        prop_assert_eq!(first, track.is_drivable(x, y));
        if x < 0.0 || y < 0.0 || x >= 200.0 || y >= 200.0 {
            prop_assert!(!first);
        }
    }

    #[test]
    fn test_any_output_vector_maps_into_range(
        raw in prop::collection::vec(prop::num::f64::ANY, 0..8),
        dead_zone in 0.0f64..0.5
    ) {
        let targets = ControlOutputs::from_raw(&raw).into_targets(OutputRange::Tanh, dead_zone);
        prop_assert!((-1.0..=1.0).contains(&targets.steer));
        prop_assert!((0.0..=1.0).contains(&targets.accelerator));
        prop_assert!((0.0..=1.0).contains(&targets.brake));
    }
}
