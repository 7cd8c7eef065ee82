//! Fan of distance sensors mounted on a vehicle.
//!
//! Rays march outward from the vehicle centre in unit steps along
//! `heading + relative_angle` until they reach the configured length or
//! sample a non-drivable pixel. Readings are normalised as *closeness*:
//! `1.0` means a wall at the centre, `0.0` means nothing within range.

use crate::config::RadarConfig;
use crate::track::TrackSurface;
use neuroracer_data::{Position, SensorRay, SensorReading};

/// Unit vector for a heading in degrees, in screen coordinates (y down).
#[inline]
#[must_use]
pub fn heading_vector(heading_deg: f64) -> (f64, f64) {
    let rad = heading_deg.to_radians();
    (rad.cos(), -rad.sin())
}

/// Number of whole unit steps a ray travels before stopping.
///
/// The sample at step 0 is the origin itself, so a vehicle whose centre sits
/// on a wall reads 0.
#[must_use]
pub fn cast_ray(track: &TrackSurface, origin: &Position, direction_deg: f64, max_length: u32) -> u32 {
    let (dx, dy) = heading_vector(direction_deg);
    let mut length = 0u32;
    while length < max_length {
        let step = f64::from(length);
        if !track.is_drivable(origin.x + dx * step, origin.y + dy * step) {
            break;
        }
        length += 1;
    }
    length
}

/// Maps a ray length into `[0, 1]` closeness.
#[inline]
#[must_use]
pub fn closeness(distance: u32, max_length: u32) -> f64 {
    if max_length == 0 {
        return 1.0;
    }
    (1.0 - f64::from(distance) / f64::from(max_length)).clamp(0.0, 1.0)
}

/// Casts every configured ray for one vehicle pose.
#[must_use]
pub fn scan(
    track: &TrackSurface,
    position: &Position,
    heading: f64,
    config: &RadarConfig,
) -> SensorReading {
    let mut reading = SensorReading::default();
    for &angle in &config.angles {
        let distance = cast_ray(track, position, heading + angle, config.max_length);
        reading.push(SensorRay {
            angle,
            distance,
            closeness: closeness(distance, config.max_length),
        });
    }
    reading
}
