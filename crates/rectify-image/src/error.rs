/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the buffer of an image would not fit in memory.
    #[error("Image size ({0}, {1}) with {2} channels overflows the buffer length")]
    SizeOverflow(usize, usize, usize),
}
