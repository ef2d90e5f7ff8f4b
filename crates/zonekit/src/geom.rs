//! Points, rings and the bounding geometry derived from them.

/// Number of decimal places kept for every ingested coordinate.
pub const COORD_DECIMALS: i32 = 5;

/// Significant digits the scaled value is pre-rounded to before the final
/// rounding step, so `1.000005` lands on `1.00001` and not on `1.0`.
const PRE_ROUND_DIGITS: i32 = 15;

/// Round a coordinate to [`COORD_DECIMALS`] decimal places (half away from zero).
#[inline]
pub fn round_coord(v: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS);
    let scaled = v * scale;
    if !scaled.is_finite() {
        return v;
    }
    pre_round(scaled).round() / scale
}

/// Round `v` to [`PRE_ROUND_DIGITS`] significant digits.
fn pre_round(v: f64) -> f64 {
    if v == 0.0 {
        return v;
    }
    let magnitude = v.abs().log10().floor() as i32;
    let factor = 10f64.powi(PRE_ROUND_DIGITS - 1 - magnitude);
    let rounded = (v * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        v
    }
}

/// A 2D coordinate in degrees: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from raw shapefile coordinates, rounding both axes.
    #[inline]
    pub fn rounded(x: f64, y: f64) -> Self {
        Self {
            x: round_coord(x),
            y: round_coord(y),
        }
    }

    #[inline]
    pub fn coord(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    #[inline]
    pub fn to_pair(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Which coordinate the finders compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
}

/// One ring (or polyline part) of a shape record.
///
/// Points are rounded on construction and kept sorted by ascending `y`, so
/// every consumer sees the same normalized order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Round and y-sort raw `(x, y)` coordinates.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points: Vec<Point> = raw
            .into_iter()
            .map(|(x, y)| Point::rounded(x, y))
            .collect();

        // Stable, so points sharing a latitude keep their shapefile order.
        points.sort_by(|a, b| a.y.total_cmp(&b.y));

        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Closest point to `key` on the `y` axis, never returning a point whose
/// coordinate equals `key`.
#[inline]
pub fn nearest(key: f64, points: &[Point]) -> Option<Point> {
    nearest_on(Axis::Y, key, points)
}

/// Farthest point from `key` on the `y` axis.
#[inline]
pub fn farthest(key: f64, points: &[Point]) -> Option<Point> {
    farthest_on(Axis::Y, key, points)
}

/// Closest point to `key` along `axis`, skipping exact matches.
///
/// Ties keep the first point encountered. Returns `None` when `points` is
/// empty or every point sits exactly on `key`.
pub fn nearest_on(axis: Axis, key: f64, points: &[Point]) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;

    for &p in points {
        let c = p.coord(axis);
        if c == key {
            continue;
        }

        let d = (c - key).abs();
        match best {
            Some((best_d, _)) if d >= best_d => {}
            _ => best = Some((d, p)),
        }
    }

    best.map(|(_, p)| p)
}

/// Farthest point from `key` along `axis`. Ties keep the first point
/// encountered; `None` only for an empty slice.
pub fn farthest_on(axis: Axis, key: f64, points: &[Point]) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;

    for &p in points {
        let d = (p.coord(axis) - key).abs();
        match best {
            Some((best_d, _)) if d <= best_d => {}
            _ => best = Some((d, p)),
        }
    }

    best.map(|(_, p)| p)
}

/// Running axis-aligned extent. Unset until the first point is folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    folded: usize,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            folded: 0,
        }
    }

    /// Grow the box to include `p`. Min fields only shrink, max fields only grow.
    #[inline]
    pub fn fold(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
        self.folded += 1;
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.folded > 0
    }

    /// `[min_x, min_y, max_x, max_y]`, once at least one point was folded.
    #[inline]
    pub fn rect(&self) -> Option<[f64; 4]> {
        self.is_valid()
            .then_some([self.min_x, self.min_y, self.max_x, self.max_y])
    }
}

/// How a ring is turned into rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundMode {
    /// One rectangle per boundary point, paired with its nearest/farthest partners.
    #[default]
    Segment,
    /// One cumulative bounding box per folded point.
    Box,
}

impl BoundMode {
    #[inline]
    pub fn from_box_flag(is_box: bool) -> Self {
        if is_box {
            BoundMode::Box
        } else {
            BoundMode::Segment
        }
    }
}

/// A single emitted rectangle plus the two corners drawn in the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// `(x0, y0, x1, y1)` as handed to the renderer. Not necessarily ordered.
    pub rect: [f64; 4],
    pub corners: [[f64; 2]; 2],
}

impl Bounds {
    /// Renderer tuple form, e.g. `(7.39119,43.72803,7.3919,43.7289)`.
    pub fn to_tuple_string(&self) -> String {
        let [x0, y0, x1, y1] = self.rect;
        format!("({},{},{},{})", x0, y0, x1, y1)
    }
}

/// Turn a normalized ring into the rectangles the render jobs cover.
///
/// Rings with fewer than two points produce nothing.
pub fn build_bounds(mode: BoundMode, ring: &Ring) -> Vec<Bounds> {
    let pts = ring.points();
    if pts.len() < 2 {
        return Vec::new();
    }

    match mode {
        BoundMode::Segment => segment_bounds(pts),
        BoundMode::Box => cumulative_boxes(pts),
    }
}

fn segment_bounds(pts: &[Point]) -> Vec<Bounds> {
    let mut out = Vec::with_capacity(pts.len());

    for &a in pts {
        // A ring sitting on a single latitude has no partner for `a`.
        let Some(b) = nearest(a.y, pts) else {
            continue;
        };
        let Some(c) = farthest(b.y, pts) else {
            continue;
        };

        out.push(Bounds {
            rect: [a.x, a.y, c.x, b.y],
            corners: [[a.x, a.y], [c.x, b.y]],
        });
    }

    out
}

fn cumulative_boxes(pts: &[Point]) -> Vec<Bounds> {
    let mut bbox = BoundingBox::new();

    pts.iter()
        .filter_map(|&p| {
            bbox.fold(p);
            let [x0, y0, x1, y1] = bbox.rect()?;
            Some(Bounds {
                rect: [x0, y0, x1, y1],
                corners: [[x0, y0], [x1, y0]],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn ring_rounds_and_sorts_by_y() {
        let ring = Ring::from_raw([(1.23456789, 5.0), (2.0, 3.0), (1.0, 9.0)]);
        assert_eq!(
            ring.points(),
            &[
                Point::new(2.0, 3.0),
                Point::new(1.23457, 5.0),
                Point::new(1.0, 9.0)
            ]
        );
    }

    #[test]
    fn decimal_half_cases_round_up() {
        assert_eq!(round_coord(1.000005), 1.00001);
        assert_eq!(round_coord(-1.000005), -1.00001);
        assert_eq!(round_coord(7.391194), 7.39119);
        assert_eq!(round_coord(0.0), 0.0);
        assert_eq!(round_coord(-179.999999), -180.0);
    }

    #[test]
    fn nearest_skips_exact_match() {
        let p = pts(&[(0.0, 5.0), (1.0, 7.0), (2.0, 4.0)]);
        assert_eq!(nearest(5.0, &p), Some(Point::new(2.0, 4.0)));
    }

    #[test]
    fn nearest_tie_keeps_first() {
        let p = pts(&[(0.0, 4.0), (1.0, 6.0), (2.0, 5.0)]);
        assert_eq!(nearest(5.0, &p), Some(Point::new(0.0, 4.0)));
    }

    #[test]
    fn nearest_none_when_empty_or_all_equal() {
        assert_eq!(nearest(1.0, &[]), None);
        let p = pts(&[(0.0, 1.0), (3.0, 1.0)]);
        assert_eq!(nearest(1.0, &p), None);
    }

    #[test]
    fn nearest_on_x_axis() {
        let p = pts(&[(0.0, 1.0), (3.0, 1.0), (2.5, 9.0)]);
        assert_eq!(nearest_on(Axis::X, 3.0, &p), Some(Point::new(2.5, 9.0)));
    }

    #[test]
    fn farthest_maximizes_distance() {
        let p = pts(&[(0.0, 4.0), (1.0, 9.0), (2.0, -3.0)]);
        assert_eq!(farthest(4.0, &p), Some(Point::new(2.0, -3.0)));
        // Equal distances: first one wins.
        let p = pts(&[(0.0, 2.0), (1.0, 6.0)]);
        assert_eq!(farthest(4.0, &p), Some(Point::new(0.0, 2.0)));
    }

    #[test]
    fn farthest_single_value_returns_it() {
        let p = pts(&[(7.0, 3.0)]);
        assert_eq!(farthest(3.0, &p), Some(Point::new(7.0, 3.0)));
        assert_eq!(farthest(3.0, &[]), None);
    }

    #[test]
    fn bounding_box_is_order_independent() {
        let p = pts(&[(1.0, 2.0), (-3.0, 8.0), (4.5, -1.0), (0.0, 0.0)]);
        let orders: [[usize; 4]; 3] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]];

        let rects: Vec<_> = orders
            .iter()
            .map(|order| {
                let mut bb = BoundingBox::new();
                for &i in order {
                    bb.fold(p[i]);
                }
                bb.rect()
            })
            .collect();

        assert_eq!(rects[0], Some([-3.0, -1.0, 4.5, 8.0]));
        assert!(rects.iter().all(|r| *r == rects[0]));
    }

    #[test]
    fn bounding_box_unset_until_folded() {
        let bb = BoundingBox::new();
        assert!(!bb.is_valid());
        assert_eq!(bb.rect(), None);
    }

    #[test]
    fn segment_rect_uses_nearest_then_farthest() {
        let ring = Ring::from_raw([(1.0, 1.0), (2.0, 2.0), (5.0, 4.0), (0.5, 10.0)]);
        let out = build_bounds(BoundMode::Segment, &ring);
        assert_eq!(out.len(), ring.len());

        for (a, bounds) in ring.points().iter().zip(&out) {
            let b = nearest(a.y, ring.points()).unwrap();
            let c = farthest(b.y, ring.points()).unwrap();
            assert_eq!(bounds.corners, [[a.x, a.y], [c.x, b.y]]);
            assert_eq!(bounds.rect, [a.x, a.y, c.x, b.y]);
        }
    }

    #[test]
    fn segment_skips_points_without_partner() {
        // All on one latitude: nearest never finds a distinct partner.
        let ring = Ring::from_raw([(1.0, 3.0), (2.0, 3.0), (4.0, 3.0)]);
        assert!(build_bounds(BoundMode::Segment, &ring).is_empty());
    }

    #[test]
    fn box_mode_emits_cumulative_boxes() {
        let ring = Ring::from_raw([(2.0, 1.0), (0.0, 2.0), (3.0, 5.0)]);
        let out = build_bounds(BoundMode::Box, &ring);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].rect, [2.0, 1.0, 2.0, 1.0]);
        assert_eq!(out[1].rect, [0.0, 1.0, 2.0, 2.0]);
        assert_eq!(out[2].rect, [0.0, 1.0, 3.0, 5.0]);
        assert_eq!(out[2].corners, [[0.0, 1.0], [3.0, 1.0]]);
    }

    #[test]
    fn single_point_ring_is_skipped() {
        let ring = Ring::from_raw([(2.0, 1.0)]);
        assert!(build_bounds(BoundMode::Box, &ring).is_empty());
        assert!(build_bounds(BoundMode::Segment, &ring).is_empty());
    }

    #[test]
    fn tuple_string_uses_shortest_form() {
        let b = Bounds {
            rect: [7.39119, 43.72803, 7.3919, 5.0],
            corners: [[0.0, 0.0], [0.0, 0.0]],
        };
        assert_eq!(b.to_tuple_string(), "(7.39119,43.72803,7.3919,5)");
    }
}
