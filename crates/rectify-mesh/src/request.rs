use rectify_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::error::RectifyError;
use crate::mesh::{Extent, Mesh, Point2D};
use crate::warper::WarpParams;

/// Raster dimensions as sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSize {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl From<RasterSize> for ImageSize {
    fn from(size: RasterSize) -> Self {
        ImageSize {
            width: size.width,
            height: size.height,
        }
    }
}

fn default_interpolate() -> bool {
    true
}

/// Everything needed to rectify one raster through a mesh.
///
/// Deserializes from the JSON body of a rectification call:
///
/// ```
/// use rectify_mesh::RectifyRequest;
///
/// let request: RectifyRequest = serde_json::from_str(r#"{
///     "triangulation": {"triangles_": []},
///     "pixelRatio": 1,
///     "targetTopLeft": [0, 0],
///     "targetResolution": 1,
///     "sourceDataExtent": [0, 0, 10, 10],
///     "sourceResolution": 1,
///     "canvasSize": {"width": 16, "height": 16},
///     "opt_renderEdges": true
/// }"#).unwrap();
///
/// assert!(request.render_edges);
/// assert!(request.interpolate);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectifyRequest {
    /// The mesh to warp through.
    pub triangulation: Mesh,
    /// Device pixel scale.
    pub pixel_ratio: f64,
    /// Origin of the destination raster in projection units.
    pub target_top_left: Point2D,
    /// Projection units per destination pixel.
    pub target_resolution: f64,
    /// Placement of the source raster.
    pub source_data_extent: Extent,
    /// Projection units per source pixel.
    pub source_resolution: f64,
    /// Size of the destination raster.
    pub canvas_size: RasterSize,
    /// Declared size of the stitch raster, checked against the decoded raster if present.
    #[serde(default)]
    pub stitch_canvas_size: Option<RasterSize>,
    /// Stroke the triangle edges after warping.
    #[serde(rename = "opt_renderEdges", default)]
    pub render_edges: bool,
    /// Sample the stitch raster bilinearly instead of nearest-neighbour.
    #[serde(rename = "opt_interpolate", default = "default_interpolate")]
    pub interpolate: bool,
}

/// A declared raster must have pixels and an RGBA buffer that fits in memory.
fn check_raster_size(name: &str, size: RasterSize) -> Result<(), RectifyError> {
    let RasterSize { width, height } = size;
    if width == 0 || height == 0 {
        return Err(RectifyError::InvalidRequest(format!(
            "{name} must be positive, got {width}x{height}"
        )));
    }
    if ImageSize::from(size).checked_len(4).is_none() {
        return Err(RectifyError::InvalidRequest(format!(
            "{name} {width}x{height} is too large"
        )));
    }
    Ok(())
}

impl RectifyRequest {
    /// The warp parameters of this request.
    pub fn warp_params(&self) -> WarpParams {
        WarpParams {
            pixel_ratio: self.pixel_ratio,
            target_top_left: self.target_top_left,
            target_resolution: self.target_resolution,
            source_extent: self.source_data_extent,
            source_resolution: self.source_resolution,
        }
    }

    /// Check the top-level parameters before any drawing happens.
    ///
    /// An empty mesh is valid and yields an untouched destination raster.
    ///
    /// # Errors
    ///
    /// Returns [`RectifyError::InvalidRequest`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RectifyError> {
        self.warp_params().validate()?;

        check_raster_size("canvasSize", self.canvas_size)?;
        if let Some(size) = self.stitch_canvas_size {
            check_raster_size("stitchCanvasSize", size)?;
        }

        Ok(())
    }
}
