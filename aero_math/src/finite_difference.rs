// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Finite-difference approximations of time derivatives from a short history of samples.

use crate::type_aliases::Float;

/// Two-point backward difference: `(current - previous) / dt`.
pub fn backward_difference(current: Float, previous: Float, dt: Float) -> Float {
    (current - previous) / dt
}

/// Three-point centered difference using samples at `n`, `n-1` and `n-2`:
/// `(value_n - value_n_minus_2) / (2 * dt)`.
///
/// Used to evaluate `dGamma/dt` from the circulation history ring without needing the
/// intermediate sample.
pub fn centered_difference_3_point(value_n: Float, value_n_minus_2: Float, dt: Float) -> Float {
    (value_n - value_n_minus_2) / (2.0 * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_difference_linear_ramp() {
        // f(t) = 2t, so df/dt = 2 everywhere.
        let dt = 0.1;
        let previous = 2.0 * 1.0;
        let current = 2.0 * 1.1;

        assert!((backward_difference(current, previous, dt) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_centered_difference_linear_ramp() {
        let dt = 0.1;
        let value_n_minus_2 = 2.0 * 0.8;
        let value_n = 2.0 * 1.0;

        assert!((centered_difference_3_point(value_n, value_n_minus_2, dt) - 2.0).abs() < 1e-10);
    }
}
