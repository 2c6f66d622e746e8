#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// raster compositing with per-draw transform and clip state.
pub mod compositor;

/// utilities to draw on images.
pub mod draw;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// image geometric transformations module.
pub mod warp;
