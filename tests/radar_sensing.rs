mod common;

use common::{ring_track, RING_START_X};
use neuroracer_lib::model::config::RadarConfig;
use neuroracer_lib::model::radar::{cast_ray, closeness, scan};
use neuroracer_lib::model::Position;

fn assert_near(actual: u32, expected: u32) {
    assert!(
        actual.abs_diff(expected) <= 2,
        "ray length {actual}, expected about {expected}"
    );
}

#[test]
fn test_ring_fan_from_start_pose() {
    let track = ring_track();
    let config = RadarConfig::default();
    let reading = scan(&track, &Position::new(RING_START_X, 400.0), 90.0, &config);

    assert_eq!(reading.len(), config.angles.len());
    let lengths: Vec<u32> = reading.rays().iter().map(|r| r.distance).collect();
    // Right-hand rays hit the outer wall, the left-most the inner one.
    assert_near(lengths[0], 85);
    assert_near(lengths[1], 118);
    assert_near(lengths[2], 210);
    assert_eq!(lengths[3], config.max_length, "open sightline along the ring");
    assert_near(lengths[4], 94);
}

#[test]
fn test_inputs_follow_angle_order() {
    let track = ring_track();
    let config = RadarConfig::default();
    let reading = scan(&track, &Position::new(RING_START_X, 400.0), 90.0, &config);
    let inputs = reading.as_inputs();

    assert_eq!(inputs.len(), 5);
    for (input, ray) in inputs.iter().zip(reading.rays()) {
        assert_eq!(*input, closeness(ray.distance, config.max_length));
    }
    assert_eq!(inputs[3], 0.0);
    assert!(inputs[0] > inputs[2], "nearer wall reads closer");
}

#[test]
fn test_rays_stop_at_the_near_wall() {
    let track = ring_track();
    let origin = Position::new(585.0, 400.0);
    assert_eq!(cast_ray(&track, &origin, 0.0, 300), 145);
    assert_eq!(cast_ray(&track, &origin, 180.0, 300), 6);
    assert_eq!(cast_ray(&track, &origin, 180.0, 4), 4, "capped at max length");
}

#[test]
fn test_vehicle_on_wall_reads_full_closeness() {
    let track = ring_track();
    let config = RadarConfig::default();
    // Centre of the ring is infield.
    let reading = scan(&track, &Position::new(400.0, 400.0), 0.0, &config);
    assert!(reading.as_inputs().iter().all(|c| *c == 1.0));

    let off_map = scan(&track, &Position::new(-5.0, 900.0), 0.0, &config);
    assert!(off_map.as_inputs().iter().all(|c| *c == 1.0));
}
