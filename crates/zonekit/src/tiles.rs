//! Spherical-mercator tile ranges for a job rectangle.
//!
//! Matches the downstream renderer's tile loop: lon/lat are projected to
//! global pixel coordinates at each zoom, then divided into 256px tiles and
//! clipped to the valid `[0, 2^z)` index range.

use crate::jobs::{ZoomBand, MAX_ZOOM};

pub const TILE_SIZE: f64 = 256.0;

/// Sine of latitude is clamped to this magnitude before the mercator log.
const MAX_SIN_LAT: f64 = 0.9999;

/// Project `(lon, lat)` degrees to global pixel coordinates at `zoom`.
#[inline]
pub fn lonlat_to_pixel(lon: f64, lat: f64, zoom: u8) -> (f64, f64) {
    let size = TILE_SIZE * 2f64.powi(zoom as i32);
    let half = size / 2.0;
    let px_per_deg = size / 360.0;
    let px_per_rad = size / (2.0 * std::f64::consts::PI);

    let x = (half + lon * px_per_deg).round();

    let f = lat.to_radians().sin().clamp(-MAX_SIN_LAT, MAX_SIN_LAT);
    let y = (half + 0.5 * ((1.0 + f) / (1.0 - f)).ln() * -px_per_rad).round();

    (x, y)
}

/// Inclusive tile index range at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl TileRange {
    #[inline]
    pub fn count(&self) -> u64 {
        let w = (self.x_max - self.x_min + 1).max(0) as u64;
        let h = (self.y_max - self.y_min + 1).max(0) as u64;
        w.saturating_mul(h)
    }
}

/// Tiles covered by `rect = [x0, y0, x1, y1]` at `zoom`.
///
/// The rectangle is taken as given: `(x0, y1)` is projected as the top-left
/// corner and `(x1, y0)` as the bottom-right one, so an inverted rectangle
/// covers no tiles. Returns `None` when nothing survives clipping or when
/// `zoom` is above [`MAX_ZOOM`].
pub fn tile_range(rect: [f64; 4], zoom: u8) -> Option<TileRange> {
    if zoom > MAX_ZOOM {
        return None;
    }

    let [x0, y0, x1, y1] = rect;
    let (px0_x, px0_y) = lonlat_to_pixel(x0, y1, zoom);
    let (px1_x, px1_y) = lonlat_to_pixel(x1, y0, zoom);

    let limit = (1i64 << zoom) - 1;
    let tile = |px: f64| (px / TILE_SIZE).trunc() as i64;

    let range = TileRange {
        zoom,
        x_min: tile(px0_x).max(0),
        x_max: tile(px1_x).min(limit),
        y_min: tile(px0_y).max(0),
        y_max: tile(px1_y).min(limit),
    };

    (range.x_min <= range.x_max && range.y_min <= range.y_max).then_some(range)
}

/// Total tiles rendered for `rect` across every zoom of `band`, saturating
/// at `u64::MAX`.
pub fn tile_count(rect: [f64; 4], band: ZoomBand) -> u64 {
    (band.min..=band.max)
        .filter_map(|z| tile_range(rect, z))
        .fold(0u64, |acc, r| acc.saturating_add(r.count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_center() {
        assert_eq!(lonlat_to_pixel(0.0, 0.0, 0), (128.0, 128.0));
        assert_eq!(lonlat_to_pixel(0.0, 0.0, 1), (256.0, 256.0));
    }

    #[test]
    fn world_at_zoom_zero_is_one_tile() {
        let r = tile_range([-180.0, -85.0, 180.0, 85.0], 0).unwrap();
        assert_eq!(r.count(), 1);
    }

    #[test]
    fn whole_world_is_clipped_to_grid() {
        let r = tile_range([-180.0, -89.0, 180.0, 89.0], 2).unwrap();
        assert_eq!((r.x_min, r.x_max, r.y_min, r.y_max), (0, 3, 0, 3));
        assert_eq!(r.count(), 16);
    }

    #[test]
    fn small_area_hits_single_tile_at_low_zoom() {
        let monaco = [7.39119, 43.72803, 7.4308, 43.7731];
        assert_eq!(tile_count(monaco, ZoomBand::new(0, 3)), 4);
    }

    #[test]
    fn zoom_beyond_max_has_no_range() {
        let world = [-180.0, -85.0, 180.0, 85.0];
        assert!(tile_range(world, MAX_ZOOM).is_some());
        assert_eq!(tile_range(world, MAX_ZOOM + 1), None);
        assert_eq!(tile_range(world, 64), None);
        assert_eq!(tile_range(world, u8::MAX), None);
    }

    #[test]
    fn huge_counts_saturate() {
        let full = TileRange {
            zoom: 63,
            x_min: 0,
            x_max: i64::MAX - 1,
            y_min: 0,
            y_max: i64::MAX - 1,
        };
        assert_eq!(full.count(), u64::MAX);

        let world = [-180.0, -85.0, 180.0, 85.0];
        let deep = tile_count(world, ZoomBand::new(28, MAX_ZOOM));
        assert!(deep > 1u64 << 60);
    }

    #[test]
    fn inverted_rect_covers_nothing() {
        let inverted = [10.0, 40.0, 5.0, 45.0];
        assert_eq!(tile_range(inverted, 12), None);
        assert_eq!(tile_count(inverted, ZoomBand::new(10, 12)), 0);
    }
}
