//! zonekit: geometry and output primitives for zone tile-job generation.
//!
//! - Points are rounded to 5 decimals on ingestion, rings are y-sorted.
//! - Each ring is turned into a list of bounding rectangles, either one per
//!   boundary point (segment mode) or one cumulative box per fold (box mode).
//! - Every rectangle becomes a [`RenderParams`] bag that feeds two emitters:
//!   render-job command lines (one per zoom band) and a GeoJSON LineString.
//!
//! Job line layout (one per zoom band, default bands 0-11, 13, 15, 17):
//!   `    render_tiles({BB}, mapfile, tile_dir, zmin, zmax, "{NAME}")`
//!
//!   BB   : "(x0,y0,x1,y1)" in EPSG:4326 degrees
//!   NAME : part id, `"{id}-{name}"` lowercased with spaces as dashes
//!
//! GeoJSON layout:
//!   FeatureCollection { crs: EPSG:4326, features: [Feature<LineString>] }
//!   with one feature per emitted rectangle.

pub mod geojson;
pub mod geom;
pub mod jobs;
pub mod jsonc;
pub mod template;
pub mod tiles;

pub use geojson::{FeatureCollection, GeoJsonEmitter};
pub use geom::{build_bounds, farthest, nearest, BoundMode, BoundingBox, Bounds, Point, Ring};
pub use jobs::{JobEmitter, RenderParams, ZoomBand, DEFAULT_BANDS};
pub use template::substitute;
pub use tiles::{tile_count, tile_range, TileRange};

/// Derive the part identifier for a record: `"{id}-{name}"`, lowercased,
/// with spaces in the name replaced by dashes.
#[inline]
pub fn part_id(id: &str, name: &str) -> String {
    format!("{}-{}", id, name.replace(' ', "-")).to_lowercase()
}
