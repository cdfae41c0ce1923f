use crate::type_aliases::Float;

use super::*;

/// Smallest pivot magnitude accepted before a matrix is treated as singular.
const SINGULAR_PIVOT_TOLERANCE: Float = 1e-12;

impl Matrix<Float> {
    /// Solves the equation system Ax = b using Gaussian elimination with partial pivoting.
    ///
    /// Source: <https://en.wikipedia.org/wiki/Gaussian_elimination>
    pub fn solve_gaussian_elimination(&self, rhs: &[Float]) -> Result<Vec<Float>, String> {
        let n = self.nr_rows();
        let m = self.nr_cols();

        // Check that the matrix is square
        assert_eq!(n, m, "Matrix must be square for Gaussian elimination");
        assert_eq!(rhs.len(), n, "Right-hand side vector length must match matrix size");

        // Create augmented matrix [A|b]
        let mut aug = Matrix::new_default([n, n + 1]);

        // Copy matrix A and vector b into augmented matrix
        for i in 0..n {
            for j in 0..n {
                aug[[i, j]] = self[[i, j]];
            }
            aug[[i, n]] = rhs[i];
        }

        // Forward elimination with partial pivoting
        for k in 0..n {
            // Find the pivot (largest absolute value in column k, from row k onwards)
            let mut max_row = k;
            for i in (k + 1)..n {
                if aug[[i, k]].abs() > aug[[max_row, k]].abs() {
                    max_row = i;
                }
            }

            // Swap rows if needed
            if max_row != k {
                for j in 0..=n {
                    let temp = aug[[k, j]];
                    aug[[k, j]] = aug[[max_row, j]];
                    aug[[max_row, j]] = temp;
                }
            }

            // Singular matrix (pivot is effectively zero)
            if aug[[k, k]].abs() < SINGULAR_PIVOT_TOLERANCE {
                return Err(format!("matrix is singular or nearly singular at pivot {}", k));
            }

            // Eliminate column k in rows below k
            for i in (k + 1)..n {
                let factor = aug[[i, k]] / aug[[k, k]];
                for j in k..=n {
                    aug[[i, j]] -= factor * aug[[k, j]];
                }
            }
        }

        // Back substitution
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1)..n {
                sum += aug[[i, j]] * x[j];
            }

            x[i] = (aug[[i, n]] - sum) / aug[[i, i]];
        }

        Ok(x)
    }
}

#[derive(Debug, Clone)]
/// An LU factorization of a square matrix with partial pivoting, kept so the same factorization
/// can be solved against many right-hand sides, e.g. once per preconditioner block and then
/// reused on every application during the iterative solve.
pub struct LuFactorization {
    /// `L` (unit lower triangular, diagonal implicit) and `U` (upper triangular) packed into one
    /// matrix, in the layout produced by in-place Gaussian elimination.
    lu: Matrix<Float>,
    /// Row permutation applied during partial pivoting: row `i` of the original matrix ended up
    /// at row `permutation[i]` of `lu`.
    permutation: Vec<usize>,
    size: usize,
}

impl Matrix<Float> {
    /// Factorizes a square matrix into `L` and `U` triangular factors with partial pivoting.
    /// Returns `Err` if the matrix is singular to within [`SINGULAR_PIVOT_TOLERANCE`].
    pub fn lu_factorize(&self) -> Result<LuFactorization, String> {
        let n = self.nr_rows();
        assert_eq!(n, self.nr_cols(), "LU factorization requires a square matrix");

        let mut lu = self.clone();
        let mut permutation: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut max_row = k;
            for i in (k + 1)..n {
                if lu[[i, k]].abs() > lu[[max_row, k]].abs() {
                    max_row = i;
                }
            }

            if max_row != k {
                for j in 0..n {
                    let temp = lu[[k, j]];
                    lu[[k, j]] = lu[[max_row, j]];
                    lu[[max_row, j]] = temp;
                }
                permutation.swap(k, max_row);
            }

            let pivot = lu[[k, k]];
            if pivot.abs() < SINGULAR_PIVOT_TOLERANCE {
                return Err(format!("matrix is singular or nearly singular at pivot {}", k));
            }

            for i in (k + 1)..n {
                let factor = lu[[i, k]] / pivot;
                lu[[i, k]] = factor;

                for j in (k + 1)..n {
                    lu[[i, j]] -= factor * lu[[k, j]];
                }
            }
        }

        Ok(LuFactorization { lu, permutation, size: n })
    }
}

impl LuFactorization {
    /// Solves `Ax = b` against the stored factorization via forward- then back-substitution.
    pub fn solve(&self, rhs: &[Float]) -> Vec<Float> {
        let n = self.size;
        assert_eq!(rhs.len(), n, "right-hand side length does not match factorization size");

        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = rhs[self.permutation[i]];
            for j in 0..i {
                sum -= self.lu[[i, j]] * y[j];
            }
            y[i] = sum;
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_solver() {
        let a = Matrix {
            data: vec![3.0, 2.0, 0.0, 2.0, 3.0, 1.0, -1.0, 1.0, 2.0],
            shape: [3, 3],
        };

        let b = vec![1.0, 2.0, 3.0];

        let x_solved = a.solve_gaussian_elimination(&b).unwrap();

        let x_numpy = vec![0.6, -0.4, 2.0]; // Manually extracted from NumPy

        for i in 0..x_solved.len() {
            assert!((x_solved[i] - x_numpy[i]).abs() < 1e-12, "Mismatch at index {}: {} != {}", i, x_solved[i], x_numpy[i]);
        }
    }

    #[test]
    fn test_singular_matrix_returns_err() {
        let a = Matrix {
            data: vec![1.0, 2.0, 2.0, 4.0],
            shape: [2, 2],
        };

        assert!(a.solve_gaussian_elimination(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_lu_factorization_matches_gaussian_elimination() {
        let a = Matrix {
            data: vec![4.0, 3.0, 6.0, 6.0, 3.0, 9.0, 12.0, 9.0, -2.0],
            shape: [3, 3],
        };

        let b = vec![1.0, 2.0, 3.0];

        let via_gauss = a.solve_gaussian_elimination(&b).unwrap();
        let via_lu = a.lu_factorize().unwrap().solve(&b);

        for i in 0..3 {
            assert!((via_gauss[i] - via_lu[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lu_factorization_reused_for_multiple_rhs() {
        let a = Matrix {
            data: vec![2.0, 0.0, 0.0, 5.0],
            shape: [2, 2],
        };

        let lu = a.lu_factorize().unwrap();

        assert_eq!(lu.solve(&[2.0, 5.0]), vec![1.0, 1.0]);
        assert_eq!(lu.solve(&[4.0, 10.0]), vec![2.0, 2.0]);
    }
}
