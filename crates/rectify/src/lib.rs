#![deny(missing_docs)]
#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rectify_image as image;

#[doc(inline)]
pub use rectify_imgproc as imgproc;

#[doc(inline)]
pub use rectify_linalg as linalg;

#[doc(inline)]
pub use rectify_mesh as mesh;

pub use rectify_mesh::{rectify, rectify_onto, RectifyError, RectifyOptions, RectifyRequest};
