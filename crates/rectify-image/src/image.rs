use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use rectify_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl ImageSize {
    /// Number of buffer elements for an image of this size with `channels` interleaved
    /// channels, or `None` if it exceeds `isize::MAX`, the largest buffer a `Vec` can hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use rectify_image::ImageSize;
    ///
    /// assert_eq!(ImageSize { width: 3, height: 2 }.checked_len(4), Some(24));
    /// assert_eq!(ImageSize { width: usize::MAX, height: 2 }.checked_len(1), None);
    /// ```
    pub fn checked_len(&self, channels: usize) -> Option<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(channels))
            .filter(|&len| len <= isize::MAX as usize)
    }

    fn buffer_len(&self, channels: usize) -> Result<usize, ImageError> {
        self.checked_len(channels)
            .ok_or(ImageError::SizeOverflow(self.width, self.height, channels))
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// Trait for image data types.
///
/// Send and Sync is required to process image rows in parallel.
pub trait ImageDtype: Copy + Default + Into<f32> + Send + Sync {
    /// Convert a f32 value to the image data type.
    fn from_f32(x: f32) -> Self;

    /// The value representing full intensity (or full opacity for alpha).
    fn full_scale() -> f32;
}

impl ImageDtype for u8 {
    fn from_f32(x: f32) -> Self {
        x.round().clamp(0.0, 255.0) as u8
    }

    fn full_scale() -> f32 {
        255.0
    }
}

/// Represents an image with pixel data.
///
/// The pixel data is stored row-major with shape (H, W, C), where H is the height of the
/// image, W the width and C the number of interleaved channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rectify_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 4>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 4],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.buffer_len(CHANNELS)?;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size, every channel set to `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rectify_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///     ImageSize { width: 10, height: 20 },
    ///     0u8,
    /// ).unwrap();
    ///
    /// assert_eq!(image.as_slice().len(), 10 * 20 * 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.buffer_len(CHANNELS)?])
    }

    /// Create a new image with the given size, every pixel set to `pixel`.
    pub fn from_size_pixel(size: ImageSize, pixel: [T; CHANNELS]) -> Result<Self, ImageError>
    where
        T: Copy,
    {
        let len = size.buffer_len(CHANNELS)?;
        let data = pixel.iter().copied().cycle().take(len).collect();
        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get all channels of the pixel at the given coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        if x >= self.cols() || y >= self.rows() {
            return None;
        }
        let start = (y * self.cols() + x) * CHANNELS;
        self.data.get(start..start + CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(<[u32; 2]>::from(image_size), [10, 20]);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.as_slice().len(), 10 * 20 * 3);

        Ok(())
    }

    #[test]
    fn image_wrong_data_length() {
        let res = Image::<u8, 4>::new([2, 2].into(), vec![0u8; 15]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(15, 16)));
    }

    #[test]
    fn image_from_size_pixel() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::from_size_pixel([3, 2].into(), [255, 0, 0, 255])?;
        assert_eq!(image.pixel(2, 1), Some(&[255u8, 0, 0, 255][..]));
        assert_eq!(image.as_slice().len(), 3 * 2 * 4);
        assert_eq!(image.pixel(3, 0), None);
        Ok(())
    }

    #[test]
    fn image_pixel_rows() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::new([2, 2].into(), vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        assert_eq!(image.pixel(1, 0), Some(&[3u8, 4][..]));
        assert_eq!(image.pixel(0, 1), Some(&[5u8, 6][..]));
        assert_eq!(image.pixel(0, 2), None);
        Ok(())
    }

    #[test]
    fn image_size_overflow_is_an_error() {
        let huge = ImageSize {
            width: 1 << 62,
            height: 4,
        };
        assert_eq!(huge.checked_len(1), None);
        assert_eq!(
            Image::<u8, 4>::from_size_pixel(huge, [255, 0, 0, 255]),
            Err(ImageError::SizeOverflow(1 << 62, 4, 4))
        );
        assert_eq!(
            Image::<u8, 1>::from_size_val(huge, 0),
            Err(ImageError::SizeOverflow(1 << 62, 4, 1))
        );
        assert_eq!(
            Image::<u8, 3>::new(huge, vec![]),
            Err(ImageError::SizeOverflow(1 << 62, 4, 3))
        );

        // fits in a usize but not in a Vec
        let wide = ImageSize {
            width: usize::MAX / 2 + 1,
            height: 1,
        };
        assert_eq!(wide.checked_len(1), None);
    }
}
