// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Right-preconditioned GMRES(restart) (§4.G): Arnoldi with modified Gram-Schmidt, Givens
//! rotations maintained incrementally so the residual norm is known without forming `y` every
//! iteration, and a panel-mode wrapper that solves the normal equations `A^T A x = A^T b`.

use aero_math::type_aliases::Float;

use crate::config::GmresSettings;
use crate::error::Error;
use crate::operator::MatrixOperator;
use crate::precondition::Preconditioner;

#[derive(Debug, Clone)]
pub struct GmresResult {
    pub solution: Vec<Float>,
    pub final_relative_residual: Float,
    pub iterations: usize,
    pub converged: bool,
}

fn dot(a: &[Float], b: &[Float]) -> Float {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[Float]) -> Float {
    dot(a, a).sqrt()
}

fn axpy(alpha: Float, x: &[Float], y: &mut [Float]) {
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}

/// Runs right-preconditioned GMRES(`settings.restart_length`) against `apply` (the action of the
/// system matrix, e.g. [`MatrixOperator::apply`] or the panel-mode normal-equations wrapper),
/// restarting up to `settings.max_outer_cycles` times.
pub fn solve(
    apply: impl Fn(&[Float]) -> Result<Vec<Float>, Error>,
    preconditioner: &dyn Preconditioner,
    rhs: &[Float],
    initial_guess: Vec<Float>,
    settings: &GmresSettings,
) -> Result<GmresResult, Error> {
    let n = rhs.len();
    let mut x = initial_guess;
    let rhs_norm = norm(rhs).max(1e-300);

    let mut total_iterations = 0;
    let mut last_relative_residual = 1.0;

    for _outer in 0..settings.max_outer_cycles {
        let mut residual = apply(&x)?;
        for (r, b) in residual.iter_mut().zip(rhs.iter()) {
            *r = b - *r;
        }

        let beta = norm(&residual);
        last_relative_residual = beta / rhs_norm;

        if beta <= settings.absolute_tolerance || last_relative_residual <= settings.relative_tolerance {
            return Ok(GmresResult {
                solution: x,
                final_relative_residual: last_relative_residual,
                iterations: total_iterations,
                converged: true,
            });
        }

        let m = settings.restart_length.min(n);
        let mut v: Vec<Vec<Float>> = vec![vec![0.0; n]; m + 1];
        let mut z: Vec<Vec<Float>> = vec![vec![0.0; n]; m];
        let mut h = vec![vec![0.0; m]; m + 1];
        let mut cs = vec![0.0; m];
        let mut sn = vec![0.0; m];
        let mut g = vec![0.0; m + 1];

        for value in v[0].iter_mut().zip(residual.iter()) {
            *value.0 = *value.1 / beta;
        }
        g[0] = beta;

        let mut used = 0;
        let mut converged = false;

        for j in 0..m {
            used = j + 1;
            total_iterations += 1;

            z[j] = preconditioner.apply(&v[j])?;
            let mut w = apply(&z[j])?;

            for i in 0..=j {
                let coefficient = dot(&w, &v[i]);
                h[i][j] = coefficient;
                axpy(-coefficient, &v[i], &mut w);
            }

            let w_norm = norm(&w);
            h[j + 1][j] = w_norm;

            if w_norm > 1e-300 {
                for (vi, wi) in v[j + 1].iter_mut().zip(w.iter()) {
                    *vi = wi / w_norm;
                }
            }

            for i in 0..j {
                let temp = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
                h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
                h[i][j] = temp;
            }

            let denom = (h[j][j] * h[j][j] + h[j + 1][j] * h[j + 1][j]).sqrt();
            if denom > 1e-300 {
                cs[j] = h[j][j] / denom;
                sn[j] = h[j + 1][j] / denom;
            } else {
                cs[j] = 1.0;
                sn[j] = 0.0;
            }

            h[j][j] = cs[j] * h[j][j] + sn[j] * h[j + 1][j];
            h[j + 1][j] = 0.0;

            g[j + 1] = -sn[j] * g[j];
            g[j] = cs[j] * g[j];

            last_relative_residual = g[j + 1].abs() / rhs_norm;
            if g[j + 1].abs() <= settings.absolute_tolerance || last_relative_residual <= settings.relative_tolerance {
                converged = true;
                break;
            }
        }

        let mut y = vec![0.0; used];
        for i in (0..used).rev() {
            let mut sum = g[i];
            for k in (i + 1)..used {
                sum -= h[i][k] * y[k];
            }
            y[i] = sum / h[i][i];
        }

        for j in 0..used {
            axpy(y[j], &z[j], &mut x);
        }

        if converged {
            return Ok(GmresResult {
                solution: x,
                final_relative_residual: last_relative_residual,
                iterations: total_iterations,
                converged: true,
            });
        }
    }

    log::warn!(
        "GMRES did not converge within {} outer cycles, final relative residual {}",
        settings.max_outer_cycles,
        last_relative_residual
    );
    Err(Error::LinearSolverDiverged { final_relative_residual: last_relative_residual })
}

/// Panel-mode wrapper: solves the normal equations `A^T A x = A^T b` by handing GMRES the
/// composite operator `x -> A^T (A x)` (§4.E, §4.G).
pub fn solve_normal_equations(
    operator: &MatrixOperator<'_>,
    preconditioner: &dyn Preconditioner,
    rhs: &[Float],
    initial_guess: Vec<Float>,
    settings: &GmresSettings,
) -> Result<GmresResult, Error> {
    let at_b = operator.apply_transpose(rhs)?;

    solve(
        |x| {
            let ax = operator.apply(x)?;
            operator.apply_transpose(&ax)
        },
        preconditioner,
        &at_b,
        initial_guess,
        settings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct IdentityPreconditioner;
    impl Preconditioner for IdentityPreconditioner {
        fn apply(&self, residual: &[Float]) -> Result<Vec<Float>, Error> {
            Ok(residual.to_vec())
        }
    }

    #[test]
    fn test_solves_diagonal_system_exactly() {
        let diagonal = vec![2.0, 4.0, 8.0];
        let apply = |x: &[Float]| -> Result<Vec<Float>, Error> {
            Ok(x.iter().zip(diagonal.iter()).map(|(xi, d)| xi * d).collect())
        };

        let rhs = vec![2.0, 8.0, 24.0];
        let settings = GmresSettings { restart_length: 3, max_outer_cycles: 2, absolute_tolerance: 1e-12, relative_tolerance: 1e-10 };

        let result = solve(apply, &IdentityPreconditioner, &rhs, vec![0.0; 3], &settings).unwrap();

        assert!(result.converged);
        assert!((result.solution[0] - 1.0).abs() < 1e-8);
        assert!((result.solution[1] - 2.0).abs() < 1e-8);
        assert!((result.solution[2] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_zero_rhs_converges_immediately() {
        let apply = |x: &[Float]| -> Result<Vec<Float>, Error> { Ok(x.to_vec()) };
        let rhs = vec![0.0, 0.0];
        let settings = GmresSettings { restart_length: 2, max_outer_cycles: 1, absolute_tolerance: 1e-12, relative_tolerance: 1e-10 };

        let result = solve(apply, &IdentityPreconditioner, &rhs, vec![0.0; 2], &settings).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
    }
}
