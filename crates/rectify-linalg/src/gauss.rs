/// Errors raised when building an augmented matrix.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LinalgError {
    /// The system has no unknowns.
    #[error("augmented matrix must have at least one row")]
    Empty,

    /// The data does not describe an N x (N + 1) matrix.
    #[error("augmented matrix must be N x (N + 1), got {rows} x {cols}")]
    InvalidShape {
        /// Number of rows found.
        rows: usize,
        /// Number of columns found.
        cols: usize,
    },
}

/// An augmented matrix `[A | b]` for the square system `A x = b`.
///
/// The matrix has `n` rows and `n + 1` columns stored row-major. Solving consumes it,
/// since elimination reduces it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMatrix {
    n: usize,
    data: Vec<f64>,
}

impl AugmentedMatrix {
    /// Create an augmented matrix from `n * (n + 1)` row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Empty`] when `n == 0` and [`LinalgError::InvalidShape`] when
    /// the data length is not `n * (n + 1)`.
    pub fn new(n: usize, data: Vec<f64>) -> Result<Self, LinalgError> {
        if n == 0 {
            return Err(LinalgError::Empty);
        }
        if data.len() != n * (n + 1) {
            return Err(LinalgError::InvalidShape {
                rows: n,
                cols: data.len() / n,
            });
        }
        Ok(Self { n, data })
    }

    /// Create an augmented matrix from fixed-width rows.
    ///
    /// # Example
    ///
    /// ```
    /// use rectify_linalg::AugmentedMatrix;
    ///
    /// // 2x + y = 5, x - y = 1
    /// let mat = AugmentedMatrix::from_rows(&[[2.0, 1.0, 5.0], [1.0, -1.0, 1.0]]).unwrap();
    /// let x = mat.solve().unwrap();
    /// assert!((x[0] - 2.0).abs() < 1e-12);
    /// assert!((x[1] - 1.0).abs() < 1e-12);
    /// ```
    pub fn from_rows<const M: usize>(rows: &[[f64; M]]) -> Result<Self, LinalgError> {
        if rows.is_empty() {
            return Err(LinalgError::Empty);
        }
        if M != rows.len() + 1 {
            return Err(LinalgError::InvalidShape {
                rows: rows.len(),
                cols: M,
            });
        }
        Self::new(rows.len(), rows.iter().flatten().copied().collect())
    }

    /// Number of unknowns.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Solve the system by Gaussian elimination with partial pivoting.
    ///
    /// Returns `None` when a pivot column has no non-zero candidate, i.e. the system is
    /// singular. The pivot test is an exact comparison against zero: nearly singular
    /// systems are solved and may yield very large coefficients.
    pub fn solve(mut self) -> Option<Vec<f64>> {
        let n = self.n;
        let cols = n + 1;

        for i in 0..n {
            // largest magnitude in column i among the unprocessed rows
            let mut max_row = i;
            let mut max_el = self.at(i, i).abs();
            for r in (i + 1)..n {
                let abs_value = self.at(r, i).abs();
                if abs_value > max_el {
                    max_el = abs_value;
                    max_row = r;
                }
            }

            if max_el == 0.0 {
                return None;
            }

            self.swap_rows(i, max_row);

            let (upper, lower) = self.data.split_at_mut((i + 1) * cols);
            let pivot_row = &upper[i * cols..];
            for row in lower.chunks_exact_mut(cols) {
                let coef = -row[i] / pivot_row[i];
                row[i] = 0.0;
                for k in (i + 1)..cols {
                    row[k] += coef * pivot_row[k];
                }
            }
        }

        // back substitution on the upper triangular system
        let mut x = vec![0.0; n];
        for l in (0..n).rev() {
            x[l] = self.at(l, n) / self.at(l, l);
            for m in 0..l {
                let delta = self.at(m, l) * x[l];
                self.data[m * cols + n] -= delta;
            }
        }

        Some(x)
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * (self.n + 1) + col]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.n + 1;
        for k in 0..cols {
            self.data.swap(a * cols + k, b * cols + k);
        }
    }
}

/// Solve `A x = b` given the augmented matrix `[A | b]`.
///
/// Returns `None` if the system is singular.
pub fn solve_linear_system(matrix: AugmentedMatrix) -> Option<Vec<f64>> {
    matrix.solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn solve_identity() -> Result<(), LinalgError> {
        let mat = AugmentedMatrix::from_rows(&[
            [1.0, 0.0, 0.0, 3.0],
            [0.0, 1.0, 0.0, -2.0],
            [0.0, 0.0, 1.0, 0.5],
        ])?;
        assert_eq!(mat.solve(), Some(vec![3.0, -2.0, 0.5]));
        Ok(())
    }

    #[test]
    fn solve_single_unknown() -> Result<(), LinalgError> {
        let mat = AugmentedMatrix::new(1, vec![4.0, 10.0])?;
        assert_eq!(solve_linear_system(mat), Some(vec![2.5]));
        Ok(())
    }

    #[test]
    fn solve_requires_row_swap() -> Result<(), LinalgError> {
        // zero on the first diagonal entry forces a pivot swap
        let mat = AugmentedMatrix::from_rows(&[[0.0, 2.0, 4.0], [3.0, 1.0, 5.0]])?;
        let x = mat.solve().expect("system is regular");
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn solve_affine_block_system() -> Result<(), LinalgError> {
        // two shifted source vertices against pixel offsets, as built per triangle
        let mat = AugmentedMatrix::from_rows(&[
            [10.0, 0.0, 0.0, 0.0, 100.0],
            [0.0, 10.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 10.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 10.0, -100.0],
        ])?;
        let x = mat.solve().expect("system is regular");
        assert_relative_eq!(x[0], 10.0);
        assert_relative_eq!(x[1], 0.0);
        assert_relative_eq!(x[2], 0.0);
        assert_relative_eq!(x[3], -10.0);
        Ok(())
    }

    #[test]
    fn solve_singular_returns_none() -> Result<(), LinalgError> {
        // collinear source points (1, 0) and (2, 0)
        let mat = AugmentedMatrix::from_rows(&[
            [1.0, 0.0, 0.0, 0.0, 5.0],
            [2.0, 0.0, 0.0, 0.0, 10.0],
            [0.0, 0.0, 1.0, 0.0, 1.0],
            [0.0, 0.0, 2.0, 0.0, 2.0],
        ])?;
        assert_eq!(mat.solve(), None);
        Ok(())
    }

    #[test]
    fn solve_near_singular_is_accepted() -> Result<(), LinalgError> {
        let mat = AugmentedMatrix::from_rows(&[[1.0, 1.0, 2.0], [1.0, 1.0 + 1e-12, 2.0]])?;
        assert!(mat.solve().is_some());
        Ok(())
    }

    #[test]
    fn invalid_shapes() {
        assert_eq!(AugmentedMatrix::new(0, vec![]), Err(LinalgError::Empty));
        assert_eq!(
            AugmentedMatrix::new(2, vec![0.0; 5]),
            Err(LinalgError::InvalidShape { rows: 2, cols: 2 })
        );
        assert_eq!(
            AugmentedMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]),
            Err(LinalgError::InvalidShape { rows: 2, cols: 2 })
        );
        let empty: &[[f64; 2]] = &[];
        assert_eq!(AugmentedMatrix::from_rows(empty), Err(LinalgError::Empty));
    }

    #[test]
    fn solve_random_systems_residual() -> Result<(), LinalgError> {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=6 {
            for _ in 0..50 {
                let a: Vec<f64> = (0..n * n).map(|_| rng.random_range(-50.0..50.0)).collect();
                let x_true: Vec<f64> = (0..n).map(|_| rng.random_range(-10.0..10.0)).collect();

                let mut data = Vec::with_capacity(n * (n + 1));
                for r in 0..n {
                    let row = &a[r * n..(r + 1) * n];
                    data.extend_from_slice(row);
                    data.push(row.iter().zip(&x_true).map(|(a, x)| a * x).sum());
                }

                let x = AugmentedMatrix::new(n, data)?
                    .solve()
                    .expect("random system is regular");
                for r in 0..n {
                    let row = &a[r * n..(r + 1) * n];
                    let lhs: f64 = row.iter().zip(&x).map(|(a, x)| a * x).sum();
                    let rhs: f64 = row.iter().zip(&x_true).map(|(a, x)| a * x).sum();
                    assert_relative_eq!(lhs, rhs, epsilon = 1e-7, max_relative = 1e-9);
                }
            }
        }
        Ok(())
    }
}
