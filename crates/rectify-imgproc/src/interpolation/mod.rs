//! Pixel interpolation methods for image transformations.
//!
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels
//!
//! Coordinates are given in pixel-index space: the centre of pixel `(i, j)` sits at
//! `(i, j)`. Coordinates outside the image are clamped to the border.

mod bilinear;
mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
