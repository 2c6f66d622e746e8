use rectify_image::Image;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Standard Bresenham walk between two integer pixels.
///
/// Callers must keep both endpoints within a pixel of the image so the walk stays short.
fn bresenham<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        set_pixel(img, x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn outcode(p: [f64; 2], lo: f64, max: [f64; 2]) -> u8 {
    let mut code = INSIDE;
    if p[0] < lo {
        code |= LEFT;
    } else if p[0] > max[0] {
        code |= RIGHT;
    }
    if p[1] < lo {
        code |= TOP;
    } else if p[1] > max[1] {
        code |= BOTTOM;
    }
    code
}

/// Cohen-Sutherland clipping of a segment to `[lo, max[0]] x [lo, max[1]]`.
///
/// The coordinate on the crossed border is set exactly, so far away endpoints do not
/// shift the clipped segment along its own direction.
fn clip_segment(
    mut a: [f64; 2],
    mut b: [f64; 2],
    lo: f64,
    max: [f64; 2],
) -> Option<([f64; 2], [f64; 2])> {
    if !a.iter().chain(&b).all(|v| v.is_finite()) {
        return None;
    }

    let (mut code_a, mut code_b) = (outcode(a, lo, max), outcode(b, lo, max));
    // each step moves one endpoint onto a border, two per endpoint at most
    for _ in 0..4 {
        if code_a | code_b == INSIDE {
            return Some((a, b));
        }
        if code_a & code_b != INSIDE {
            return None;
        }

        let (p, q, code) = if code_a != INSIDE {
            (a, b, code_a)
        } else {
            (b, a, code_b)
        };
        let (dx, dy) = (q[0] - p[0], q[1] - p[1]);
        let moved = if code & TOP != 0 {
            [p[0] + dx * (lo - p[1]) / dy, lo]
        } else if code & BOTTOM != 0 {
            [p[0] + dx * (max[1] - p[1]) / dy, max[1]]
        } else if code & LEFT != 0 {
            [lo, p[1] + dy * (lo - p[0]) / dx]
        } else {
            [max[0], p[1] + dy * (max[0] - p[0]) / dx]
        };
        if !(moved[0].is_finite() && moved[1].is_finite()) {
            return None;
        }

        if code_a != INSIDE {
            a = moved;
            code_a = outcode(a, lo, max);
        } else {
            b = moved;
            code_b = outcode(b, lo, max);
        }
    }

    (code_a | code_b == INSIDE).then_some((a, b))
}

/// Draws a line on an image inplace using a standard Bresenham's line algorithm.
///
/// The segment is first clipped to the area whose points round to a pixel of the image,
/// so endpoints may lie arbitrarily far outside. Segments with a non-finite endpoint are
/// ignored.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as (x, y) pixel coordinates.
/// * `p1` - The end point of the line as (x, y) pixel coordinates.
/// * `color` - The color of the line as an array of `C` elements.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: [f64; 2],
    p1: [f64; 2],
    color: [u8; C],
) {
    if img.cols() == 0 || img.rows() == 0 {
        return;
    }
    let max = [img.cols() as f64 - 0.5, img.rows() as f64 - 0.5];
    let Some((a, b)) = clip_segment(p0, p1, -0.5, max) else {
        return;
    };

    let to_pixel = |p: [f64; 2]| (p[0].round() as i64, p[1].round() as i64);
    bresenham(img, to_pixel(a), to_pixel(b), color);
}

/// Strokes the outline of a closed polygon inplace.
///
/// Vertices are rounded to the nearest pixel; the closing edge from the last vertex back
/// to the first is drawn as well.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The polygon vertices as (x, y) pixel coordinates.
/// * `color` - The color of the outline.
pub fn draw_polygon<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[[f64; 2]],
    color: [u8; C],
) {
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        draw_line(img, *a, *b, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rectify_image::{Image, ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, [0.0, 0.0], [4.0, 4.0], [255]);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_line_clipped_to_image() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([3, 1].into(), 0)?;
        draw_line(&mut img, [-5.0, 0.0], [10.0, 0.0], [9]);
        assert_eq!(img.as_slice(), &[9, 9, 9]);
        Ok(())
    }

    #[test]
    fn test_draw_line_far_endpoints() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([4, 3].into(), 0)?;
        draw_line(&mut img, [-1e19, 1.0], [1e19, 1.0], [5]);
        assert_eq!(img.as_slice(), &[0, 0, 0, 0, 5, 5, 5, 5, 0, 0, 0, 0]);

        // entirely outside, and not finite
        let mut img = Image::<u8, 1>::from_size_val([4, 3].into(), 0)?;
        draw_line(&mut img, [-1e10, -3.0], [1e10, -2.0], [5]);
        draw_line(&mut img, [f64::NAN, 1.0], [2.0, 1.0], [5]);
        assert!(img.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_clip_segment_diagonal() {
        let (a, b) = clip_segment([-10.0, -10.0], [20.0, 20.0], -0.5, [3.5, 3.5])
            .expect("crosses the rectangle");
        assert_eq!(a, [-0.5, -0.5]);
        assert_eq!(b, [3.5, 3.5]);
        assert_eq!(clip_segment([5.0, -1.0], [9.0, 2.0], -0.5, [3.5, 3.5]), None);
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_polygon_triangle() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_polygon(&mut img, &[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]], [7]);
        assert_eq!(
            img.as_slice(),
            &[
                7, 7, 7, 7, 7,
                7, 0, 0, 7, 0,
                7, 0, 7, 0, 0,
                7, 7, 0, 0, 0,
                7, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_polygon_rgba() -> Result<(), ImageError> {
        let mut img = Image::<u8, 4>::from_size_val([4, 4].into(), 0)?;
        draw_polygon(
            &mut img,
            &[[1.2, 0.8], [2.6, 1.0], [1.0, 2.9]],
            [0, 0, 0, 255],
        );
        assert_eq!(img.pixel(1, 1), Some(&[0u8, 0, 0, 255][..]));
        assert_eq!(img.pixel(3, 1), Some(&[0u8, 0, 0, 255][..]));
        assert_eq!(img.pixel(1, 3), Some(&[0u8, 0, 0, 255][..]));
        assert_eq!(img.pixel(0, 0), Some(&[0u8, 0, 0, 0][..]));
        Ok(())
    }

    #[test]
    fn test_draw_polygon_far_off_canvas() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([10, 10].into(), 0)?;
        draw_polygon(&mut img, &[[-1e19, 5.0], [1e19, 5.0], [0.0, -5.0]], [3]);
        // the horizontal edge crosses the whole image
        for x in 0..10 {
            assert_eq!(img.pixel(x, 5), Some(&[3u8][..]), "pixel ({x}, 5)");
        }
        assert_eq!(img.pixel(5, 8), Some(&[0u8][..]));
        Ok(())
    }
}
