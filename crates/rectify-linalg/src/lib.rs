#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Gaussian elimination on augmented matrices.
pub mod gauss;

pub use gauss::{solve_linear_system, AugmentedMatrix, LinalgError};
