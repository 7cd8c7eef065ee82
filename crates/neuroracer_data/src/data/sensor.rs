use serde::{Deserialize, Serialize};

/// Hard cap on rays per vehicle; keeps readings allocation-free.
pub const MAX_SENSOR_RAYS: usize = 8;

/// One radar probe result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorRay {
    /// Relative to the vehicle heading, degrees.
    pub angle: f64,
    /// Whole pixels travelled before hitting a wall or the ray cap.
    pub distance: u32,
    /// `1.0` with a wall at the vehicle centre, `0.0` when the ray ran its full length.
    pub closeness: f64,
}

/// Fixed-capacity radar readout for one vehicle and one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    rays: [SensorRay; MAX_SENSOR_RAYS],
    len: usize,
}

impl SensorReading {
    /// Appends a ray; rays beyond the capacity are dropped.
    pub fn push(&mut self, ray: SensorRay) {
        if self.len < MAX_SENSOR_RAYS {
            self.rays[self.len] = ray;
            self.len += 1;
        }
    }

    #[must_use]
    pub fn rays(&self) -> &[SensorRay] {
        &self.rays[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes the controller input vector (closeness per ray, in ray order).
    pub fn write_inputs(&self, buf: &mut Vec<f64>) {
        buf.clear();
        buf.extend(self.rays().iter().map(|r| r.closeness));
    }

    #[must_use]
    pub fn as_inputs(&self) -> Vec<f64> {
        let mut buf = Vec::with_capacity(self.len);
        self.write_inputs(&mut buf);
        buf
    }
}
