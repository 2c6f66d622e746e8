use std::ops::Range;

use rectify_image::ImageSize;

/// Distance below which a pixel centre counts as lying on a polygon edge.
const EDGE_EPSILON: f64 = 1e-9;

/// A closed polygon restricting where a draw may write.
///
/// A destination pixel `(x, y)` is covered when its centre `(x + 0.5, y + 0.5)` lies
/// inside the polygon (even-odd rule) or exactly on its boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPolygon {
    points: Vec<[f64; 2]>,
}

/// Rows and columns of a raster touched by a clip region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBounds {
    /// Column range.
    pub x: Range<usize>,
    /// Row range.
    pub y: Range<usize>,
}

impl ClipPolygon {
    /// Create a polygon from its vertices; the closing edge is implicit.
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }

    /// The polygon vertices.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Iterate over the polygon edges, including the closing one.
    fn edges(&self) -> impl Iterator<Item = (&[f64; 2], &[f64; 2])> {
        self.points
            .iter()
            .zip(self.points.iter().cycle().skip(1))
            .take(self.points.len())
    }

    /// Whether the point lies inside or on the boundary of the polygon.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if on_segment(a, b, px, py) {
                return true;
            }
            if (a[1] > py) != (b[1] > py) {
                let x_cross = a[0] + (py - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether the pixel `(x, y)` is covered by the polygon.
    pub fn covers_pixel(&self, x: usize, y: usize) -> bool {
        self.contains(x as f64 + 0.5, y as f64 + 0.5)
    }

    /// Pixel ranges whose centres fall within the polygon's bounding box, clamped to
    /// a raster of `size`. Returns `None` if no pixel can be covered.
    pub fn pixel_bounds(&self, size: ImageSize) -> Option<PixelBounds> {
        bounds_of_points(self.points.iter().copied(), size)
    }
}

/// Pixel ranges of a raster whose centres fall within the bounding box of `points`.
pub(crate) fn bounds_of_points(
    points: impl Iterator<Item = [f64; 2]>,
    size: ImageSize,
) -> Option<PixelBounds> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for [x, y] in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let x = centre_range(min_x, max_x, size.width)?;
    let y = centre_range(min_y, max_y, size.height)?;
    Some(PixelBounds { x, y })
}

/// Indices `i` in `0..len` with `lo <= i + 0.5 <= hi`.
fn centre_range(lo: f64, hi: f64, len: usize) -> Option<Range<usize>> {
    if !(lo.is_finite() && hi.is_finite()) || len == 0 {
        return None;
    }
    let start = (lo - 0.5).ceil().max(0.0);
    let end = ((hi - 0.5).floor() + 1.0).min(len as f64);
    (start < end).then(|| start as usize..end as usize)
}

fn on_segment(a: &[f64; 2], b: &[f64; 2], px: f64, py: f64) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let (qx, qy) = (px - a[0], py - a[1]);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return qx.abs() <= EDGE_EPSILON && qy.abs() <= EDGE_EPSILON;
    }
    let cross = dx * qy - dy * qx;
    if cross.abs() > EDGE_EPSILON * len2.sqrt() {
        return false;
    }
    let dot = dx * qx + dy * qy;
    (0.0..=len2).contains(&dot)
}
