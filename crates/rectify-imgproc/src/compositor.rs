use rectify_image::{Image, ImageDtype, ImageSize};

use crate::draw::draw_polygon;
use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel::{par_iter_rows_mut, ExecutionStrategy, ParallelError};
use crate::warp::{bounds_of_points, Affine2, ClipPolygon, PixelBounds};

/// Errors raised by a compositor while drawing.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CompositorError {
    /// The parallel executor failed.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

/// How a sampled source pixel is combined with the destination pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Alpha compositing with the last channel as straight alpha.
    #[default]
    SourceOver,
    /// Overwrite the destination pixel.
    Copy,
}

/// Transform and clip applied to a single draw call.
///
/// The state lives only for the call it is passed to; nothing carries over to the next
/// draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawState {
    /// Maps source raster pixel coordinates to destination pixel coordinates.
    pub transform: Affine2,
    /// Optional polygon, in destination pixels, outside of which nothing is written.
    pub clip: Option<ClipPolygon>,
}

/// Drawing backend able to composite rasters onto a destination raster.
pub trait RasterCompositor<const C: usize> {
    /// Size of the destination raster.
    fn size(&self) -> ImageSize;

    /// Set every destination pixel to `color`.
    fn fill(&mut self, color: [u8; C]);

    /// Draw `src` through the transform of `state`, restricted to its clip.
    ///
    /// Returns the number of destination pixels that received a source sample.
    fn draw_image(
        &mut self,
        src: &Image<u8, C>,
        state: &DrawState,
    ) -> Result<usize, CompositorError>;

    /// Draw `src` untransformed with its top-left corner at `offset`.
    fn draw_image_at(
        &mut self,
        src: &Image<u8, C>,
        offset: (f64, f64),
    ) -> Result<usize, CompositorError> {
        let state = DrawState {
            transform: Affine2::translation(offset.0, offset.1),
            clip: None,
        };
        self.draw_image(src, &state)
    }

    /// Stroke the outline of a closed polygon given in destination pixels.
    fn stroke_polygon(&mut self, points: &[[f64; 2]], color: [u8; C]);
}

/// A CPU compositor writing into a borrowed destination image.
///
/// Every covered destination pixel centre is mapped back through the inverse draw
/// transform and sampled from the source raster; samples falling outside the source
/// leave the destination untouched.
pub struct CpuCompositor<'a, const C: usize> {
    dst: &'a mut Image<u8, C>,
    interpolation: InterpolationMode,
    blend: BlendMode,
    strategy: ExecutionStrategy,
}

impl<'a, const C: usize> CpuCompositor<'a, C> {
    /// Create a compositor with bilinear sampling, source-over blending and parallel rows.
    pub fn new(dst: &'a mut Image<u8, C>) -> Self {
        Self {
            dst,
            interpolation: InterpolationMode::default(),
            blend: BlendMode::default(),
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Set the sampling mode.
    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set how rows of a single draw are scheduled.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Read access to the destination image.
    pub fn image(&self) -> &Image<u8, C> {
        &*self.dst
    }
}

impl<const C: usize> RasterCompositor<C> for CpuCompositor<'_, C> {
    fn size(&self) -> ImageSize {
        self.dst.size()
    }

    fn fill(&mut self, color: [u8; C]) {
        self.dst
            .as_slice_mut()
            .chunks_exact_mut(C)
            .for_each(|px| px.copy_from_slice(&color));
    }

    fn draw_image(
        &mut self,
        src: &Image<u8, C>,
        state: &DrawState,
    ) -> Result<usize, CompositorError> {
        if src.width() == 0 || src.height() == 0 {
            return Ok(0);
        }

        let Some(inverse) = state.transform.inverse() else {
            log::trace!("skipping draw with a non-invertible transform");
            return Ok(0);
        };

        let size = self.dst.size();
        let (src_w, src_h) = (src.width() as f64, src.height() as f64);

        // footprint of the transformed source rectangle
        let corners = [[0.0, 0.0], [src_w, 0.0], [src_w, src_h], [0.0, src_h]].map(|[x, y]| {
            let (u, v) = state.transform.transform_point(x, y);
            [u, v]
        });
        let Some(mut bounds) = bounds_of_points(corners.into_iter(), size) else {
            return Ok(0);
        };
        if let Some(clip) = &state.clip {
            let Some(clip_bounds) = clip
                .pixel_bounds(size)
                .and_then(|cb| intersect(&bounds, &cb))
            else {
                return Ok(0);
            };
            bounds = clip_bounds;
        }

        let row_len = size.width * C;
        let rows = &mut self.dst.as_slice_mut()[bounds.y.start * row_len..bounds.y.end * row_len];
        let (interpolation, blend) = (self.interpolation, self.blend);
        let clip = state.clip.as_ref();
        let cols = bounds.x.clone();

        let written = par_iter_rows_mut(rows, row_len, bounds.y.start, self.strategy, |y, row| {
            let mut written = 0;
            for x in cols.clone() {
                if clip.is_some_and(|clip| !clip.covers_pixel(x, y)) {
                    continue;
                }
                let (su, sv) = inverse.transform_point(x as f64 + 0.5, y as f64 + 0.5);
                if su < 0.0 || sv < 0.0 || su >= src_w || sv >= src_h {
                    continue;
                }
                let sample =
                    interpolate_pixel(src, (su - 0.5) as f32, (sv - 0.5) as f32, interpolation);
                blend_pixel(blend, &sample, &mut row[x * C..(x + 1) * C]);
                written += 1;
            }
            written
        })?;

        Ok(written)
    }

    fn stroke_polygon(&mut self, points: &[[f64; 2]], color: [u8; C]) {
        draw_polygon(self.dst, points, color);
    }
}

fn intersect(a: &PixelBounds, b: &PixelBounds) -> Option<PixelBounds> {
    let x = a.x.start.max(b.x.start)..a.x.end.min(b.x.end);
    let y = a.y.start.max(b.y.start)..a.y.end.min(b.y.end);
    (!x.is_empty() && !y.is_empty()).then_some(PixelBounds { x, y })
}

fn blend_pixel<const C: usize>(mode: BlendMode, src: &[f32; C], dst: &mut [u8]) {
    let full = <u8 as ImageDtype>::full_scale();
    let src_alpha = src[C - 1] / full;

    if mode == BlendMode::Copy || C < 2 || src_alpha >= 1.0 {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = <u8 as ImageDtype>::from_f32(*s);
        }
        return;
    }
    if src_alpha <= 0.0 {
        return;
    }

    let dst_alpha = dst[C - 1] as f32 / full;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    for k in 0..C - 1 {
        let value =
            (src[k] * src_alpha + dst[k] as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        dst[k] = <u8 as ImageDtype>::from_f32(value);
    }
    dst[C - 1] = <u8 as ImageDtype>::from_f32(out_alpha * full);
}
