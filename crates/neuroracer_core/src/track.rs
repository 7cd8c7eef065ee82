//! Drivable-surface map derived from a track image.
//!
//! Every radar step and collision probe of every vehicle ends up in
//! [`TrackSurface::is_drivable`], so the surface is a flat bitmap with an
//! O(1) lookup and no interior mutability.

use crate::config::TrackConfig;
use crate::error::TrackError;
use image::DynamicImage;
use neuroracer_data::Position;
use std::path::Path;

/// Immutable drivability bitmap, indexed `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSurface {
    width: u32,
    height: u32,
    drivable: Vec<bool>,
}

/// Spawn pose and lap line resolved against a concrete map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPose {
    pub position: Position,
    pub heading: f64,
    /// Lap radius already scaled to this map.
    pub lap_radius: f64,
}

impl TrackSurface {
    /// Builds a surface from a predicate over pixel coordinates.
    pub fn from_fn<F>(width: u32, height: u32, mut drivable: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(drivable(x, y));
            }
        }
        Self {
            width,
            height,
            drivable: cells,
        }
    }

    /// Interprets an image: pixels equal to `boundary` are walls, everything else is track.
    pub fn from_image(image: &DynamicImage, boundary: [u8; 4]) -> Result<Self, TrackError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TrackError::Empty { width, height });
        }
        let drivable = rgba.pixels().map(|p| p.0 != boundary).collect();
        Ok(Self {
            width,
            height,
            drivable,
        })
    }

    /// Loads and decodes a map asset from disk.
    pub fn load(path: impl AsRef<Path>, boundary: [u8; 4]) -> Result<Self, TrackError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackError::NotFound(path.to_path_buf()));
        }
        let image = image::open(path).map_err(|source| TrackError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let surface = Self::from_image(&image, boundary)?;
        tracing::info!(
            path = %path.display(),
            width = surface.width,
            height = surface.height,
            drivable_pct = surface.drivable_fraction() * 100.0,
            "Track loaded"
        );
        Ok(surface)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// `false` outside the map, on boundary pixels, and for non-finite coordinates.
    #[inline]
    #[must_use]
    pub fn is_drivable(&self, x: f64, y: f64) -> bool {
        // Negated comparison so NaN falls through to `false`.
        if !(x >= 0.0 && y >= 0.0) {
            return false;
        }
        let (px, py) = (x.floor(), y.floor());
        if px >= f64::from(self.width) || py >= f64::from(self.height) {
            return false;
        }
        self.drivable[self.index(px as u32, py as u32)]
    }

    #[inline]
    #[must_use]
    pub fn is_drivable_at(&self, position: &Position) -> bool {
        self.is_drivable(position.x, position.y)
    }

    /// Manually set a pixel (useful for tests and procedurally built maps).
    pub fn set_drivable(&mut self, x: u32, y: u32, drivable: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.drivable[idx] = drivable;
        }
    }

    #[must_use]
    pub fn drivable_fraction(&self) -> f64 {
        if self.drivable.is_empty() {
            return 0.0;
        }
        self.drivable.iter().filter(|d| **d).count() as f64 / self.drivable.len() as f64
    }

    /// Ratio between this map and the width the pixel constants were tuned for.
    #[must_use]
    pub fn scale(&self, reference_width: f64) -> f64 {
        f64::from(self.width) / reference_width
    }

    /// Resolves the configured spawn point and lap radius against this map.
    #[must_use]
    pub fn start_pose(&self, config: &TrackConfig) -> StartPose {
        StartPose {
            position: Position::new(
                config.start_x * f64::from(self.width),
                config.start_y * f64::from(self.height),
            ),
            heading: config.start_heading.rem_euclid(360.0),
            lap_radius: config.lap_radius * self.scale(config.reference_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn corridor() -> TrackSurface {
        TrackSurface::from_fn(20, 10, |_, y| (3..7).contains(&y))
    }

    #[test]
    fn test_out_of_bounds_is_not_drivable() {
        let track = corridor();
        assert!(!track.is_drivable(-0.5, 5.0));
        assert!(!track.is_drivable(5.0, -0.01));
        assert!(!track.is_drivable(20.0, 5.0));
        assert!(!track.is_drivable(5.0, 10.0));
        assert!(!track.is_drivable(f64::NAN, 5.0));
        assert!(!track.is_drivable(5.0, f64::INFINITY));
    }

    #[test]
    fn test_pixel_lookup_floors() {
        let track = corridor();
        assert!(track.is_drivable(0.0, 3.0));
        assert!(track.is_drivable(19.99, 6.99));
        assert!(!track.is_drivable(10.0, 7.0));
        assert!(!track.is_drivable(10.0, 2.99));
    }

    #[test]
    fn test_from_image_boundary_color() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([40, 40, 40, 255]));
        img.put_pixel(1, 2, Rgba([255, 255, 255, 255]));
        let track = TrackSurface::from_image(&DynamicImage::ImageRgba8(img), [255, 255, 255, 255])
            .expect("valid image");
        assert!(!track.is_drivable(1.5, 2.5));
        assert!(track.is_drivable(2.5, 2.5));
        assert_eq!(track.width(), 4);
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = RgbaImage::new(0, 0);
        let result = TrackSurface::from_image(&DynamicImage::ImageRgba8(img), [0, 0, 0, 255]);
        assert!(matches!(result, Err(TrackError::Empty { .. })));
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let result = TrackSurface::load("definitely/not/here.png", [255, 255, 255, 255]);
        assert!(matches!(result, Err(TrackError::NotFound(_))));
    }

    #[test]
    fn test_start_pose_scales_with_map() {
        let track = TrackSurface::from_fn(960, 540, |_, _| true);
        let config = TrackConfig {
            start_x: 0.25,
            start_y: 0.5,
            start_heading: -90.0,
            lap_radius: 100.0,
            reference_width: 1920.0,
            ..Default::default()
        };
        let pose = track.start_pose(&config);
        assert_eq!(pose.position, Position::new(240.0, 270.0));
        assert_eq!(pose.heading, 270.0);
        assert!((pose.lap_radius - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_drivable() {
        let mut track = corridor();
        track.set_drivable(5, 5, false);
        assert!(!track.is_drivable(5.2, 5.9));
        track.set_drivable(500, 500, true);
        assert_eq!(track.width(), 20);
    }
}
