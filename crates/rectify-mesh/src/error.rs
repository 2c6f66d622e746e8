use rectify_image::ImageError;
use rectify_imgproc::{compositor::CompositorError, parallel::ParallelError};

/// An error type for the rectification pipeline.
///
/// Degenerate triangles are not errors: they are skipped and counted in
/// [`crate::WarpReport::skipped`].
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RectifyError {
    /// A top-level request parameter is missing or out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An input raster could not be loaded or does not match the request.
    #[error("failed to load raster: {0}")]
    RasterLoad(String),

    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error while compositing onto the destination raster.
    #[error(transparent)]
    Compositor(#[from] CompositorError),

    /// Error while scheduling work across threads.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
