// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! RHS assembly and the Kutta/Kelvin constraint rows (§4.H): `b[i] = -n_i . V_total(x_i)` for an
//! ordinary panel, `0` for a base-region panel (whose row is the identity, §4.E) and for every
//! Kelvin row.

use rayon::prelude::*;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::error::Error;
use crate::external::RotorDisk;
use crate::geometry::kelvin::KelvinGroups;
use crate::geometry::GridLevel;

/// Every velocity contribution the RHS needs that is not itself a solved unknown (§4.H): free
/// stream, rigid-body/rotational motion, rotor disks, mirrored reflections, and the counter-term
/// for the panel's own body-frame motion.
pub struct AmbientFlow<'a> {
    pub free_stream: SpatialVector,
    pub rigid_body_velocity_at: Box<dyn Fn(SpatialVector) -> SpatialVector + Sync + 'a>,
    pub mirror_velocity_at: Box<dyn Fn(SpatialVector) -> SpatialVector + Sync + 'a>,
    pub body_motion_velocity_at: Box<dyn Fn(SpatialVector) -> SpatialVector + Sync + 'a>,
    pub rotors: &'a [Box<dyn RotorDisk + Sync>],
}

impl<'a> AmbientFlow<'a> {
    fn total_at(&self, point: SpatialVector) -> SpatialVector {
        let mut v = self.free_stream
            + (self.rigid_body_velocity_at)(point)
            + (self.mirror_velocity_at)(point)
            - (self.body_motion_velocity_at)(point);

        for rotor in self.rotors {
            v += rotor.induced_velocity_at(point);
        }

        v
    }
}

/// Builds the augmented RHS vector (length `N_loops + N_kelvin_groups + 1`, index 0 sentinel),
/// applying a control surface's commanded hinge rotation to its panel normal before the dot
/// product, and overriding base-region/Kelvin rows to zero (§4.H).
pub fn build_rhs(
    surface: &GridLevel,
    kelvin: &KelvinGroups,
    ambient: &AmbientFlow,
    hinge_angle_by_loop: impl Fn(usize) -> Option<(Float, SpatialVector)> + Sync,
) -> Result<Vec<Float>, Error> {
    let n = surface.loops.len();

    let rows: Vec<Float> = surface
        .loops
        .par_iter()
        .enumerate()
        .map(|(index, panel)| {
            let loop_id = index + 1;
            if kelvin.is_base_region(loop_id) {
                return 0.0;
            }

            let normal = match hinge_angle_by_loop(loop_id) {
                Some((angle, hinge_axis)) => rotate_about_axis(panel.normal, hinge_axis, angle),
                None => panel.normal,
            };

            -normal.dot(ambient.total_at(panel.centroid))
        })
        .collect();

    let mut rhs = vec![0.0; 1 + n + kelvin.number_of_groups];
    rhs[1..=n].copy_from_slice(&rows);
    Ok(rhs)
}

/// Rotates `vector` about `axis` by `angle` radians using Rodrigues' rotation formula.
fn rotate_about_axis(vector: SpatialVector, axis: SpatialVector, angle: Float) -> SpatialVector {
    let k = axis.normalize();
    let cos_a = angle.cos();
    let sin_a = angle.sin();

    vector * cos_a + k.cross(vector) * sin_a + k * (k.dot(vector) * (1.0 - cos_a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::kelvin::build_kelvin_groups;
    use crate::geometry::provider::test_support::FlatRectangularWing;
    use crate::geometry::provider::GeometryProvider;

    fn no_rotors() -> Vec<Box<dyn RotorDisk + Sync>> {
        vec![]
    }

    #[test]
    fn test_build_rhs_matches_uniform_free_stream_dot_normal() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let rotors = no_rotors();

        let ambient = AmbientFlow {
            free_stream: SpatialVector::new(0.0, 0.0, -1.0),
            rigid_body_velocity_at: Box::new(|_| SpatialVector::default()),
            mirror_velocity_at: Box::new(|_| SpatialVector::default()),
            body_motion_velocity_at: Box::new(|_| SpatialVector::default()),
            rotors: &rotors,
        };

        let rhs = build_rhs(hierarchy.finest(), &kelvin, &ambient, |_| None).unwrap();

        // Flat wing has normal +z everywhere: b[i] = -(+z . (0,0,-1)) = 1.0 for every non-base
        // panel.
        for loop_id in 1..=hierarchy.finest().loops.len() {
            if !kelvin.is_base_region(loop_id) {
                assert!((rhs[loop_id] - 1.0).abs() < 1e-12);
            } else {
                assert_eq!(rhs[loop_id], 0.0);
            }
        }
    }

    #[test]
    fn test_rotate_about_axis_preserves_length() {
        let v = SpatialVector::new(1.0, 0.0, 0.0);
        let rotated = rotate_about_axis(v, SpatialVector::unit_z(), std::f64::consts::FRAC_PI_2 as Float);

        assert!((rotated.length() - 1.0).abs() < 1e-9);
        assert!(rotated.y() > 0.9);
    }
}
