// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Supersonic kernel support (§4.A): the Mach-cone admissibility test and the generalized
//! principal-part downwash `Ws` an edge contributes to its two adjacent loops when Mach >= 1 and
//! the downwind loop lies inside the source's Mach cone.
//!
//! The split between the two adjacent loops uses equal weights (documented in
//! [`DESIGN.md`](../../../DESIGN.md) as a simplification of the reference project's supersonic
//! branch, which this crate does not carry over verbatim).

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

/// The half-angle of the Mach cone, `asin(1 / Mach)`, for `Mach > 1`.
pub fn mach_cone_half_angle(mach: Float) -> Float {
    (1.0 / mach).asin()
}

/// Whether `point` lies within the upstream Mach cone of `source`, measured along
/// `free_stream_direction`.
pub fn is_in_mach_cone(
    source: SpatialVector,
    point: SpatialVector,
    free_stream_direction: SpatialVector,
    mach: Float,
) -> bool {
    if mach < 1.0 {
        return true;
    }

    let relative = point - source;
    let axial_distance = relative.dot(free_stream_direction);

    if axial_distance <= 0.0 {
        return false;
    }

    let radial_distance_sq = relative.length_squared() - axial_distance * axial_distance;
    let radial_distance = radial_distance_sq.max(0.0).sqrt();

    let half_angle = mach_cone_half_angle(mach);
    radial_distance <= axial_distance * half_angle.tan()
}

/// The generalized principal-part downwash `Ws` associated with an edge whose downwind loop lies
/// in the Mach cone, split evenly between the edge's two adjacent loops.
pub fn principal_part_downwash(edge_circulation: Float, mach: Float) -> Float {
    if mach < 1.0 {
        return 0.0;
    }

    let beta = (mach * mach - 1.0).sqrt();
    edge_circulation / (2.0 * std::f64::consts::PI as Float * beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsonic_mach_is_always_in_cone() {
        assert!(is_in_mach_cone(
            SpatialVector::default(),
            SpatialVector::new(0.0, 5.0, 0.0),
            SpatialVector::unit_x(),
            0.8
        ));
    }

    #[test]
    fn test_point_behind_source_is_not_in_cone() {
        assert!(!is_in_mach_cone(
            SpatialVector::default(),
            SpatialVector::new(-1.0, 0.0, 0.0),
            SpatialVector::unit_x(),
            2.0
        ));
    }

    #[test]
    fn test_point_on_axis_downstream_is_in_cone() {
        assert!(is_in_mach_cone(
            SpatialVector::default(),
            SpatialVector::new(1.0, 0.0, 0.0),
            SpatialVector::unit_x(),
            2.0
        ));
    }

    #[test]
    fn test_principal_part_is_zero_subsonic() {
        assert_eq!(principal_part_downwash(1.0, 0.5), 0.0);
    }
}
