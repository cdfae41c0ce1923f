// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Diagonal Jacobi preconditioner (§4.F): the cheap fallback when a full block factorization is
//! not worth the setup cost, e.g. during the first few time steps of an unsteady run before the
//! wake has built up enough structure for the coarse hierarchy to be stable.

use rayon::prelude::*;

use aero_math::type_aliases::Float;

use crate::config::PreconditionerSettings;
use crate::error::Error;
use crate::geometry::kelvin::KelvinGroups;
use crate::geometry::GridLevel;
use crate::vortex::segment::induced_velocity_of_segment;

use super::Preconditioner;

pub struct JacobiPreconditioner {
    /// `1 / diagonal` per augmented row, with relaxation already folded in.
    inverse_diagonal: Vec<Float>,
}

impl JacobiPreconditioner {
    pub fn build(
        finest: &GridLevel,
        kelvin: &KelvinGroups,
        settings: &PreconditionerSettings,
        viscous_core_length: Float,
    ) -> Self {
        let diagonal: Vec<Float> = finest
            .loops
            .par_iter()
            .enumerate()
            .map(|(index, target_loop)| {
                let target_id = index + 1;

                if kelvin.is_base_region(target_id) {
                    return 1.0;
                }

                let mut value = 0.0;
                for &edge_id in &target_loop.edges {
                    let edge = finest.edge(edge_id);
                    let p1 = finest.node(edge.nodes[0]).position;
                    let p2 = finest.node(edge.nodes[1]).position;

                    if let Ok(unit_velocity) =
                        induced_velocity_of_segment(p1, p2, target_loop.centroid, viscous_core_length)
                    {
                        let sign = if edge.left_loop == target_id {
                            1.0
                        } else if edge.right_loop == target_id {
                            -1.0
                        } else {
                            0.0
                        };
                        value += sign * unit_velocity.dot(target_loop.normal);
                    }
                }
                value
            })
            .collect();

        let mut inverse_diagonal = vec![1.0];
        inverse_diagonal.extend(diagonal.into_iter().map(|d| {
            if d.abs() > 1e-12 {
                settings.jacobi_relaxation / d
            } else {
                settings.jacobi_relaxation
            }
        }));
        inverse_diagonal.extend(std::iter::repeat(1.0).take(kelvin.number_of_groups));

        Self { inverse_diagonal }
    }
}

impl Preconditioner for JacobiPreconditioner {
    fn apply(&self, residual: &[Float]) -> Result<Vec<Float>, Error> {
        if residual.len() != self.inverse_diagonal.len() {
            return Err(Error::BadHierarchy(format!(
                "jacobi preconditioner residual length {} does not match expected {}",
                residual.len(),
                self.inverse_diagonal.len()
            )));
        }

        Ok(residual
            .iter()
            .zip(self.inverse_diagonal.iter())
            .map(|(r, inv_d)| r * inv_d)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::kelvin::build_kelvin_groups;
    use crate::geometry::provider::test_support::FlatRectangularWing;
    use crate::geometry::provider::GeometryProvider;
    use aero_math::spatial_vector::SpatialVector;

    #[test]
    fn test_apply_scales_residual_by_relaxation_when_diagonal_is_small() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 1, spanwise_panels: 1 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let settings = PreconditionerSettings::default();

        let preconditioner = JacobiPreconditioner::build(hierarchy.finest(), &kelvin, &settings, 1e-3);

        let n = 1 + hierarchy.finest().loops.len() + kelvin.number_of_groups;
        let residual = vec![2.0; n];
        let solved = preconditioner.apply(&residual).unwrap();

        assert_eq!(solved.len(), n);
    }

    #[test]
    fn test_apply_rejects_wrong_length() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 1, spanwise_panels: 1 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let settings = PreconditionerSettings::default();

        let preconditioner = JacobiPreconditioner::build(hierarchy.finest(), &kelvin, &settings, 1e-3);
        assert!(preconditioner.apply(&[1.0, 2.0]).is_err());
    }
}
