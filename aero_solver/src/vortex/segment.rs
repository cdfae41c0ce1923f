// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Biot-Savart induced velocity for a single straight vortex segment with a viscous core.

use aero_math::consts::PI;
use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::error::Error;

const FOUR_PI_INVERSE: Float = 1.0 / (4.0 * PI);
const CLOSENESS_ERROR: Float = 1.0e-10;

/// Induced velocity at `control_point` from a straight segment `[p1, p2]` carrying unit
/// circulation, regularized with a Lamb-Oseen-style viscous core of radius `viscous_core_length`.
///
/// Source: VSAERO user manual, <https://ntrs.nasa.gov/api/citations/19900004884/downloads/19900004884.pdf>
///
/// Returns [`Error::BadGeometry`] if `p1` and `p2` coincide.
pub fn induced_velocity_of_segment(
    p1: SpatialVector,
    p2: SpatialVector,
    control_point: SpatialVector,
    viscous_core_length: Float,
) -> Result<SpatialVector, Error> {
    if (p2 - p1).length_squared() < CLOSENESS_ERROR {
        return Err(Error::BadGeometry {
            loop_id: 0,
            message: "vortex segment endpoints coincide".to_string(),
        });
    }

    let r1 = control_point - p1;
    let r2 = control_point - p2;

    let r1_length_sq = r1.length_squared();
    let r2_length_sq = r2.length_squared();
    let r1_length = r1_length_sq.sqrt();
    let r2_length = r2_length_sq.sqrt();

    let r1_r2 = r1_length * r2_length;
    let denominator = r1_r2 * (r1_r2 + r1.dot(r2));

    if denominator.abs() <= CLOSENESS_ERROR {
        return Ok(SpatialVector::default());
    }

    let core_term = if viscous_core_length == 0.0 {
        1.0
    } else {
        viscous_core_term(p1, p2, control_point, viscous_core_length, r1_length_sq, r2_length_sq)
    };

    let k = (r1_length + r2_length) / denominator;

    Ok(core_term * r1.cross(r2) * (k * FOUR_PI_INVERSE))
}

fn normal_distance_squared(
    p1: SpatialVector,
    p2: SpatialVector,
    control_point: SpatialVector,
    r1_length_sq: Float,
    r2_length_sq: Float,
) -> Float {
    let relative_line = p2 - p1;
    let relative_point = control_point - p1;

    let line_length_sq = relative_line.length_squared();
    let line_length = line_length_sq.sqrt();
    let line_direction = relative_line / line_length;

    let parallel_distance_from_start = relative_point.dot(line_direction);

    if parallel_distance_from_start < 0.0 {
        r1_length_sq
    } else if parallel_distance_from_start > line_length {
        r2_length_sq
    } else {
        let parallel_component_sq = parallel_distance_from_start * parallel_distance_from_start;
        relative_point.length_squared() - parallel_component_sq
    }
}

/// Source: J. T. Reid (2020), "A general approach to lifting-line theory, applied to wings with
/// sweep", <https://digitalcommons.usu.edu/cgi/viewcontent.cgi?article=8982&context=etd>
fn viscous_core_term(
    p1: SpatialVector,
    p2: SpatialVector,
    control_point: SpatialVector,
    viscous_core_length: Float,
    r1_length_sq: Float,
    r2_length_sq: Float,
) -> Float {
    let distance_squared = normal_distance_squared(p1, p2, control_point, r1_length_sq, r2_length_sq);
    let denominator = (viscous_core_length.powi(4) + distance_squared * distance_squared).sqrt();

    if denominator > 0.0 {
        distance_squared / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_endpoints_is_bad_geometry() {
        let p = SpatialVector::new(1.0, 2.0, 3.0);
        let result = induced_velocity_of_segment(p, p, SpatialVector::default(), 0.0);

        assert!(matches!(result, Err(Error::BadGeometry { .. })));
    }

    #[test]
    fn test_induced_velocity_decays_with_distance() {
        let p1 = SpatialVector::new(-0.5, 0.0, 0.0);
        let p2 = SpatialVector::new(0.5, 0.0, 0.0);

        let near = induced_velocity_of_segment(p1, p2, SpatialVector::new(0.0, 1.0, 0.0), 0.0).unwrap();
        let far = induced_velocity_of_segment(p1, p2, SpatialVector::new(0.0, 10.0, 0.0), 0.0).unwrap();

        assert!(near.length() > far.length());
    }

    #[test]
    fn test_viscous_core_suppresses_singularity_on_the_line() {
        let p1 = SpatialVector::new(-0.5, 0.0, 0.0);
        let p2 = SpatialVector::new(0.5, 0.0, 0.0);
        let on_line_but_off_segment = SpatialVector::new(2.0, 0.0, 0.0);

        // Off the finite segment but collinear: denominator term stays nonzero, core term applies.
        let with_core = induced_velocity_of_segment(p1, p2, on_line_but_off_segment, 0.1).unwrap();
        assert!(with_core.length().is_finite());
    }
}
