use rectify_image::{Image, ImageSize};
use rectify_imgproc::{
    compositor::{CpuCompositor, RasterCompositor},
    interpolation::InterpolationMode,
    parallel::ExecutionStrategy,
};

use crate::error::RectifyError;
use crate::request::RectifyRequest;
use crate::warper::{TriangleWarper, WarpReport};

/// Rendering knobs that are not part of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectifyOptions {
    /// Initial colour of the destination raster.
    pub background: [u8; 4],
    /// Colour used to stroke triangle edges when the request asks for them.
    pub edge_color: [u8; 4],
    /// Thread scheduling for triangle derivation and row compositing.
    pub strategy: ExecutionStrategy,
}

impl Default for RectifyOptions {
    fn default() -> Self {
        Self {
            background: [255, 0, 0, 255],
            edge_color: [0, 0, 0, 255],
            strategy: ExecutionStrategy::default(),
        }
    }
}

/// Rectify a request into a newly allocated RGBA raster of `canvasSize`.
///
/// The destination is filled with the background colour, the primary `source` raster is
/// drawn at the origin, and `stitch` is warped through every mesh triangle on top of it.
///
/// # Errors
///
/// - [`RectifyError::InvalidRequest`] if a top-level parameter is out of range.
/// - [`RectifyError::RasterLoad`] if `stitch` does not match `stitchCanvasSize`.
pub fn rectify(
    request: &RectifyRequest,
    source: &Image<u8, 4>,
    stitch: &Image<u8, 4>,
    options: &RectifyOptions,
) -> Result<Image<u8, 4>, RectifyError> {
    request.validate()?;

    let mut dst = Image::from_size_pixel(request.canvas_size.into(), options.background)?;
    let report = rectify_onto(request, source, stitch, &mut dst, options)?;
    log::debug!(
        "rectified {} into {}: {:?}",
        stitch.size(),
        dst.size(),
        report
    );

    Ok(dst)
}

/// Rectify a request onto an existing destination raster.
///
/// Everything is validated before the destination is touched, so an error leaves `dst`
/// unchanged.
///
/// # Errors
///
/// - [`RectifyError::InvalidRequest`] if a top-level parameter is out of range or `dst`
///   does not have the size of `canvasSize`.
/// - [`RectifyError::RasterLoad`] if `stitch` does not match `stitchCanvasSize`.
pub fn rectify_onto(
    request: &RectifyRequest,
    source: &Image<u8, 4>,
    stitch: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    options: &RectifyOptions,
) -> Result<WarpReport, RectifyError> {
    request.validate()?;

    let canvas: ImageSize = request.canvas_size.into();
    if dst.size() != canvas {
        return Err(RectifyError::InvalidRequest(format!(
            "destination is {} but canvasSize is {}",
            dst.size(),
            canvas
        )));
    }
    if let Some(declared) = request.stitch_canvas_size {
        let declared: ImageSize = declared.into();
        if stitch.size() != declared {
            return Err(RectifyError::RasterLoad(format!(
                "stitch raster is {} but stitchCanvasSize is {}",
                stitch.size(),
                declared
            )));
        }
    }

    let warper = TriangleWarper::new(request.warp_params())?.with_strategy(options.strategy);

    let interpolation = if request.interpolate {
        InterpolationMode::Bilinear
    } else {
        InterpolationMode::Nearest
    };
    let mut compositor = CpuCompositor::new(dst)
        .with_interpolation(interpolation)
        .with_strategy(options.strategy);

    compositor.draw_image_at(source, (0.0, 0.0))?;

    let edge_color = request.render_edges.then_some(options.edge_color);
    warper.warp(&request.triangulation, stitch, &mut compositor, edge_color)
}
