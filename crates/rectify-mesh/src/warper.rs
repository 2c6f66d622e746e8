use rectify_image::Image;
use rectify_imgproc::{
    compositor::{DrawState, RasterCompositor},
    parallel::{par_map_ordered, ExecutionStrategy},
    warp::{Affine2, ClipPolygon},
};
use rectify_linalg::AugmentedMatrix;

use crate::error::RectifyError;
use crate::mesh::{Extent, Mesh, Point2D, Triangle};

/// Snap a value to the device pixel grid.
///
/// `round(value * pixel_ratio) / pixel_ratio`; applying it twice gives the same result as
/// applying it once.
///
/// # Example
///
/// ```
/// use rectify_mesh::round_to_pixel_ratio;
///
/// assert_eq!(round_to_pixel_ratio(2.4, 1.0), 2.0);
/// assert_eq!(round_to_pixel_ratio(2.4, 2.0), 2.5);
/// ```
pub fn round_to_pixel_ratio(value: f64, pixel_ratio: f64) -> f64 {
    (value * pixel_ratio).round() / pixel_ratio
}

/// Request-level constants shared by every triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpParams {
    /// Device pixel scale.
    pub pixel_ratio: f64,
    /// Origin of the destination raster in projection units.
    pub target_top_left: Point2D,
    /// Projection units per destination pixel.
    pub target_resolution: f64,
    /// Placement of the source raster.
    pub source_extent: Extent,
    /// Projection units per source pixel.
    pub source_resolution: f64,
}

impl WarpParams {
    /// Check that every parameter is finite and every scale strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`RectifyError::InvalidRequest`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RectifyError> {
        let positive = [
            ("pixelRatio", self.pixel_ratio),
            ("targetResolution", self.target_resolution),
            ("sourceResolution", self.source_resolution),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RectifyError::InvalidRequest(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !self.target_top_left.is_finite() {
            return Err(RectifyError::InvalidRequest(
                "targetTopLeft must be finite".to_string(),
            ));
        }

        let e = &self.source_extent;
        let finite = [e.min_x, e.min_y, e.max_x, e.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || e.min_x > e.max_x || e.min_y > e.max_y {
            return Err(RectifyError::InvalidRequest(format!(
                "sourceDataExtent must be finite with min <= max, got [{}, {}, {}, {}]",
                e.min_x, e.min_y, e.max_x, e.max_y
            )));
        }

        Ok(())
    }
}

/// The solved warp of one triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleAffine {
    /// Linear part `[a00, a01, a10, a11]` mapping shifted source offsets to pixel offsets.
    pub coefficients: [f64; 4],
    /// Destination pixel position of the first target vertex.
    pub anchor: [f64; 2],
    /// Source coordinates subtracted from every source vertex before solving.
    pub shift: Point2D,
    /// Destination pixel positions of the three target vertices.
    pub pixels: [[f64; 2]; 3],
    /// Maps stitch raster pixels to destination pixels.
    pub transform: Affine2,
    /// Destination clip, `p1 -> p0 -> p2`.
    pub clip: ClipPolygon,
}

impl TriangleAffine {
    /// Draw state for compositing the stitch raster through this triangle.
    pub fn draw_state(&self) -> DrawState {
        DrawState {
            transform: self.transform,
            clip: Some(self.clip.clone()),
        }
    }
}

/// Outcome of warping a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WarpReport {
    /// Triangles composited onto the destination.
    pub drawn: usize,
    /// Triangles skipped because their source points are degenerate.
    pub skipped: usize,
    /// Destination pixels that received a sample.
    pub pixels_written: usize,
}

/// Warps a raster through a mesh, one exact affine map per triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleWarper {
    params: WarpParams,
    strategy: ExecutionStrategy,
}

impl TriangleWarper {
    /// Create a warper for the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RectifyError::InvalidRequest`] if the parameters are out of range.
    pub fn new(params: WarpParams) -> Result<Self, RectifyError> {
        params.validate()?;
        Ok(Self {
            params,
            strategy: ExecutionStrategy::default(),
        })
    }

    /// Set how per-triangle transforms are derived across threads.
    ///
    /// Drawing is always applied in mesh order regardless of the strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The warp parameters.
    pub fn params(&self) -> &WarpParams {
        &self.params
    }

    /// Convert a target projection point to snapped destination pixel coordinates.
    ///
    /// Projection y grows upwards while pixel rows grow downwards, hence the sign flip.
    pub fn to_pixel(&self, p: Point2D) -> [f64; 2] {
        let WarpParams {
            pixel_ratio,
            target_top_left: origin,
            target_resolution: res,
            ..
        } = self.params;
        [
            round_to_pixel_ratio((p.x - origin.x) / res, pixel_ratio),
            round_to_pixel_ratio(-(p.y - origin.y) / res, pixel_ratio),
        ]
    }

    /// Solve the affine warp of one triangle.
    ///
    /// Returns `None` when the source points are collinear (the linear system is
    /// singular) or the solution is not finite.
    pub fn affine_for(&self, triangle: &Triangle) -> Option<TriangleAffine> {
        let [[u0, v0], [u1, v1], [u2, v2]] = triangle.target.map(|p| self.to_pixel(p));

        // the first source vertex becomes the origin to keep the system well scaled
        let shift = triangle.source[0];
        let (x1, y1) = (triangle.source[1].x - shift.x, triangle.source[1].y - shift.y);
        let (x2, y2) = (triangle.source[2].x - shift.x, triangle.source[2].y - shift.y);

        let system = AugmentedMatrix::from_rows(&[
            [x1, y1, 0.0, 0.0, u1 - u0],
            [x2, y2, 0.0, 0.0, u2 - u0],
            [0.0, 0.0, x1, y1, v1 - v0],
            [0.0, 0.0, x2, y2, v2 - v0],
        ])
        .ok()?;
        let solution = system.solve()?;
        let coefficients: [f64; 4] = solution.try_into().ok()?;
        if !coefficients.iter().all(|c| c.is_finite()) {
            return None;
        }

        let WarpParams {
            pixel_ratio,
            source_extent: extent,
            source_resolution,
            ..
        } = self.params;
        let transform = Affine2::from_linear(coefficients, u0, v0)
            .translate(extent.min_x - shift.x, extent.max_y - shift.y)
            .scale(
                source_resolution / pixel_ratio,
                -source_resolution / pixel_ratio,
            );

        Some(TriangleAffine {
            coefficients,
            anchor: [u0, v0],
            shift,
            pixels: [[u0, v0], [u1, v1], [u2, v2]],
            transform,
            clip: ClipPolygon::new(vec![[u1, v1], [u0, v0], [u2, v2]]),
        })
    }

    /// Composite `stitch` through every triangle of `mesh` onto the compositor.
    ///
    /// Degenerate triangles are skipped and counted. When `edge_color` is given, the
    /// outline of every triangle is stroked after all triangles are drawn.
    ///
    /// # Errors
    ///
    /// Only compositor or thread-pool failures are reported; no triangle aborts the batch.
    pub fn warp<const C: usize, R: RasterCompositor<C>>(
        &self,
        mesh: &Mesh,
        stitch: &Image<u8, C>,
        compositor: &mut R,
        edge_color: Option<[u8; C]>,
    ) -> Result<WarpReport, RectifyError> {
        let affines = par_map_ordered(&mesh.triangles, self.strategy, |t| self.affine_for(t))?;

        let mut report = WarpReport::default();
        for (i, affine) in affines.iter().enumerate() {
            let Some(affine) = affine else {
                log::debug!("triangle {i} has degenerate source points, skipping");
                report.skipped += 1;
                continue;
            };
            log::trace!("triangle {i}: transform {:?}", affine.transform.m);
            report.pixels_written += compositor.draw_image(stitch, &affine.draw_state())?;
            report.drawn += 1;
        }

        if let Some(color) = edge_color {
            for triangle in &mesh.triangles {
                let pixels = triangle.target.map(|p| self.to_pixel(p));
                compositor.stroke_polygon(&pixels, color);
            }
        }

        if report.drawn == 0 && !mesh.is_empty() {
            log::warn!("all {} triangles were degenerate", mesh.len());
        }
        log::debug!(
            "warped {} triangles ({} skipped, {} pixels)",
            report.drawn,
            report.skipped,
            report.pixels_written
        );

        Ok(report)
    }
}
