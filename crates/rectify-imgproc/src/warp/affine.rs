/// A 2D affine transformation stored as a row-major 2x3 matrix.
///
/// | m[0] m[1] m[2] |
/// | m[3] m[4] m[5] |
///
/// A point `(x, y)` maps to `(m[0] x + m[1] y + m[2], m[3] x + m[4] y + m[5])`.
///
/// The builder methods ([`Affine2::transform`], [`Affine2::translate`],
/// [`Affine2::scale`]) post-multiply, like the current-transform calls of a 2D canvas:
/// the last call applied is the first one to act on a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    /// The matrix coefficients.
    pub m: [f64; 6],
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// Create a transform from its six coefficients.
    pub const fn new(m: [f64; 6]) -> Self {
        Self { m }
    }

    /// A pure translation.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            m: [1.0, 0.0, tx, 0.0, 1.0, ty],
        }
    }

    /// A pure axis-aligned scaling.
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            m: [sx, 0.0, 0.0, 0.0, sy, 0.0],
        }
    }

    /// A linear map `[[a, b], [c, d]]` followed by a translation `(tx, ty)`.
    pub const fn from_linear(linear: [f64; 4], tx: f64, ty: f64) -> Self {
        Self {
            m: [linear[0], linear[1], tx, linear[2], linear[3], ty],
        }
    }

    /// Returns `self * inner`: `inner` is applied to a point first, then `self`.
    pub fn compose(&self, inner: &Affine2) -> Affine2 {
        let a = &self.m;
        let b = &inner.m;
        Affine2 {
            m: [
                a[0] * b[0] + a[1] * b[3],
                a[0] * b[1] + a[1] * b[4],
                a[0] * b[2] + a[1] * b[5] + a[2],
                a[3] * b[0] + a[4] * b[3],
                a[3] * b[1] + a[4] * b[4],
                a[3] * b[2] + a[4] * b[5] + a[5],
            ],
        }
    }

    /// Post-multiply by another transform.
    pub fn transform(&self, other: &Affine2) -> Affine2 {
        self.compose(other)
    }

    /// Post-multiply by a translation.
    pub fn translate(&self, tx: f64, ty: f64) -> Affine2 {
        self.compose(&Affine2::translation(tx, ty))
    }

    /// Post-multiply by a scaling.
    pub fn scale(&self, sx: f64, sy: f64) -> Affine2 {
        self.compose(&Affine2::scaling(sx, sy))
    }

    /// Applies the transformation to a point.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }

    /// Inverts the transformation.
    ///
    /// Returns `None` when the linear part is singular or the result is not finite.
    pub fn inverse(&self) -> Option<Affine2> {
        let (a, b, c, d, e, f) = (
            self.m[0], self.m[1], self.m[2], self.m[3], self.m[4], self.m[5],
        );

        let determinant = a * e - b * d;
        if determinant == 0.0 || !determinant.is_finite() {
            return None;
        }
        let inv_determinant = 1.0 / determinant;

        let new_a = e * inv_determinant;
        let new_b = -b * inv_determinant;
        let new_d = -d * inv_determinant;
        let new_e = a * inv_determinant;
        let new_c = -(new_a * c + new_b * f);
        let new_f = -(new_d * c + new_e * f);

        let inv = Affine2::new([new_a, new_b, new_c, new_d, new_e, new_f]);
        inv.m.iter().all(|v| v.is_finite()).then_some(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::Affine2;
    use approx::assert_relative_eq;

    #[test]
    fn compose_applies_inner_first() {
        let t = Affine2::translation(10.0, 0.0).scale(2.0, 3.0);
        let (x, y) = t.transform_point(1.0, 1.0);
        assert_relative_eq!(x, 12.0);
        assert_relative_eq!(y, 3.0);
    }

    #[test]
    fn canvas_call_sequence() {
        // translate(5, 5) -> transform(rot90) -> scale(1, -1)
        let t = Affine2::identity()
            .translate(5.0, 5.0)
            .transform(&Affine2::from_linear([0.0, -1.0, 1.0, 0.0], 0.0, 0.0))
            .scale(1.0, -1.0);
        let (x, y) = t.transform_point(2.0, 3.0);
        // scale: (2, -3); rot90: (3, 2); translate: (8, 7)
        assert_relative_eq!(x, 8.0);
        assert_relative_eq!(y, 7.0);
    }

    #[test]
    fn inverse_roundtrip() {
        let t = Affine2::new([2.0, 0.5, -3.0, -1.0, 4.0, 7.0]);
        let inv = t.inverse().expect("invertible");
        let id = t.compose(&inv);
        for (a, b) in id.m.iter().zip(Affine2::identity().m.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_singular() {
        assert_eq!(Affine2::scaling(0.0, 1.0).inverse(), None);
        assert_eq!(Affine2::new([1.0, 2.0, 0.0, 2.0, 4.0, 0.0]).inverse(), None);
    }
}
