//! Geometric primitives for compositing one raster onto another.
//!
//! - [`Affine2`]: 2x3 affine transforms with canvas-style composition and inversion
//! - [`ClipPolygon`]: closed polygons restricting the pixels a draw may write
//!
//! # Examples
//!
//! ```
//! use rectify_imgproc::warp::Affine2;
//!
//! let m = Affine2::translation(10.0, 5.0).scale(2.0, -2.0);
//! assert_eq!(m.transform_point(1.0, 1.0), (12.0, 3.0));
//! ```

mod affine;
mod clip;

pub use affine::Affine2;
pub use clip::{ClipPolygon, PixelBounds};

pub(crate) use clip::bounds_of_points;
