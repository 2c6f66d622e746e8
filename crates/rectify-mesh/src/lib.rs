#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the rectification pipeline.
pub mod error;

/// Mesh and geometry types.
pub mod mesh;

/// End-to-end rectification of a request.
pub mod pipeline;

/// Rectification request parameters and their validation.
pub mod request;

/// Per-triangle affine derivation and compositing.
pub mod warper;

pub use crate::error::RectifyError;
pub use crate::mesh::{Extent, Mesh, Point2D, Triangle};
pub use crate::pipeline::{rectify, rectify_onto, RectifyOptions};
pub use crate::request::{RasterSize, RectifyRequest};
pub use crate::warper::{
    round_to_pixel_ratio, TriangleAffine, TriangleWarper, WarpParams, WarpReport,
};
