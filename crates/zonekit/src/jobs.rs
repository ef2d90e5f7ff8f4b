//! Render-job command lines.

use serde::Deserialize;

use crate::geom::Bounds;
use crate::template::substitute;

/// Highest zoom level the projection math accepts.
pub const MAX_ZOOM: u8 = 30;

/// An inclusive zoom range rendered by one job line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ZoomBand {
    pub min: u8,
    pub max: u8,
}

impl ZoomBand {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.max <= MAX_ZOOM
    }
}

/// Overview up to zoom 11, then single detail levels 13, 15 and 17.
pub const DEFAULT_BANDS: [ZoomBand; 4] = [
    ZoomBand::new(0, 11),
    ZoomBand::new(13, 13),
    ZoomBand::new(15, 15),
    ZoomBand::new(17, 17),
];

/// Substitution bag for one emitted rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Renderer bbox tuple, see [`Bounds::to_tuple_string`].
    pub bb: String,
    /// Corner pairs drawn in the GeoJSON preview. Never substituted into text.
    pub json: Vec<[f64; 2]>,
    /// Part id the tiles are rendered under.
    pub name: String,
}

impl RenderParams {
    pub fn new(bounds: &Bounds, part_id: &str) -> Self {
        Self {
            bb: bounds.to_tuple_string(),
            json: bounds.corners.to_vec(),
            name: part_id.to_owned(),
        }
    }

    /// The string-valued slots a job line may reference.
    #[inline]
    pub fn text_slots(&self) -> [(&str, &str); 2] {
        [("BB", self.bb.as_str()), ("NAME", self.name.as_str())]
    }
}

/// Expands each [`RenderParams`] into one `render_tiles(...)` line per zoom band.
#[derive(Debug, Clone)]
pub struct JobEmitter {
    bands: Vec<ZoomBand>,
    lines: Vec<String>,
}

impl Default for JobEmitter {
    fn default() -> Self {
        Self::new(&DEFAULT_BANDS)
    }
}

impl JobEmitter {
    pub fn new(bands: &[ZoomBand]) -> Self {
        let lines = bands
            .iter()
            .map(|b| {
                format!(
                    "    render_tiles({{BB}}, mapfile, tile_dir, {}, {}, \"{{NAME}}\")",
                    b.min, b.max
                )
            })
            .collect();

        Self {
            bands: bands.to_vec(),
            lines,
        }
    }

    #[inline]
    pub fn bands(&self) -> &[ZoomBand] {
        &self.bands
    }

    #[inline]
    pub fn band_count(&self) -> usize {
        self.lines.len()
    }

    /// Append one line per band for `params`, in band order.
    pub fn emit(&self, params: &RenderParams, out: &mut Vec<String>) {
        out.extend(
            self.lines
                .iter()
                .map(|line| substitute(line, params.text_slots())),
        );
    }
}
