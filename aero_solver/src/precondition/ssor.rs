// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Edge-SSOR preconditioner (§4.F): one symmetric Gauss-Seidel sweep (forward then backward)
//! over the edge adjacency graph, using only direct panel-to-panel neighbors (loops sharing an
//! edge) rather than the full dense influence.

use aero_math::type_aliases::Float;

use crate::config::PreconditionerSettings;
use crate::error::Error;
use crate::geometry::kelvin::KelvinGroups;
use crate::geometry::GridLevel;
use crate::vortex::segment::induced_velocity_of_segment;

use super::Preconditioner;

struct Row {
    diagonal: Float,
    /// `(neighbor_loop_id, coefficient)` pairs, one per edge-adjacent neighbor.
    neighbors: Vec<(usize, Float)>,
}

pub struct SsorPreconditioner {
    rows: Vec<Row>,
    is_base_region: Vec<bool>,
    number_of_kelvin_groups: usize,
    relaxation: Float,
}

impl SsorPreconditioner {
    pub fn build(
        finest: &GridLevel,
        kelvin: &KelvinGroups,
        settings: &PreconditionerSettings,
        viscous_core_length: Float,
    ) -> Self {
        let rows: Vec<Row> = finest
            .loops
            .iter()
            .enumerate()
            .map(|(index, target_loop)| {
                let target_id = index + 1;
                let mut diagonal = 0.0;
                let mut neighbors = Vec::new();

                for &edge_id in &target_loop.edges {
                    let edge = finest.edge(edge_id);
                    let p1 = finest.node(edge.nodes[0]).position;
                    let p2 = finest.node(edge.nodes[1]).position;

                    let unit_velocity = match induced_velocity_of_segment(p1, p2, target_loop.centroid, viscous_core_length) {
                        Ok(v) => v,
                        Err(_) => continue,
                    };
                    let value = unit_velocity.dot(target_loop.normal);

                    if edge.left_loop == target_id {
                        diagonal += value;
                        if edge.right_loop != 0 {
                            neighbors.push((edge.right_loop, -value));
                        }
                    } else if edge.right_loop == target_id {
                        diagonal -= value;
                        if edge.left_loop != 0 {
                            neighbors.push((edge.left_loop, value));
                        }
                    }
                }

                Row { diagonal, neighbors }
            })
            .collect();

        let is_base_region = (1..=finest.loops.len()).map(|id| kelvin.is_base_region(id)).collect();

        Self {
            rows,
            is_base_region,
            number_of_kelvin_groups: kelvin.number_of_groups,
            relaxation: settings.jacobi_relaxation,
        }
    }
}

impl Preconditioner for SsorPreconditioner {
    /// One symmetric sweep: forward Gauss-Seidel followed by backward Gauss-Seidel, both using
    /// only already-updated neighbor values (in-place), which is the standard SSOR application
    /// when used as a preconditioner rather than iterated to convergence.
    fn apply(&self, residual: &[Float]) -> Result<Vec<Float>, Error> {
        let n = self.rows.len();
        let expected_len = 1 + n + self.number_of_kelvin_groups;
        if residual.len() != expected_len {
            return Err(Error::BadHierarchy(format!(
                "ssor preconditioner residual length {} does not match expected {}",
                residual.len(),
                expected_len
            )));
        }

        let mut x = vec![0.0; expected_len];

        for index in 0..n {
            x[index + 1] = self.solve_one_row(index, residual, &x);
        }
        for index in (0..n).rev() {
            x[index + 1] = self.solve_one_row(index, residual, &x);
        }

        for i in 1..=n {
            if self.is_base_region[i - 1] {
                x[i] = residual[i];
            }
        }
        for row in (n + 1)..expected_len {
            x[row] = residual[row];
        }

        Ok(x)
    }
}

impl SsorPreconditioner {
    fn solve_one_row(&self, index: usize, residual: &[Float], x: &[Float]) -> Float {
        if self.is_base_region[index] {
            return residual[index + 1];
        }

        let row = &self.rows[index];
        if row.diagonal.abs() <= 1e-12 {
            return 0.0;
        }

        let mut sum = residual[index + 1];
        for &(neighbor, coefficient) in &row.neighbors {
            sum -= coefficient * x[neighbor];
        }

        self.relaxation * sum / row.diagonal + (1.0 - self.relaxation) * x[index + 1]
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
    fn test_apply_preserves_vector_length() {
        let wing = FlatRectangularWing { span: 4.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let settings = PreconditionerSettings::default();

        let preconditioner = SsorPreconditioner::build(hierarchy.finest(), &kelvin, &settings, 1e-3);

        let n = 1 + hierarchy.finest().loops.len() + kelvin.number_of_groups;
        let residual = vec![1.0; n];
        let solved = preconditioner.apply(&residual).unwrap();

        assert_eq!(solved.len(), n);
    }

    #[test]
    fn test_base_region_row_passes_through() {
        let wing = FlatRectangularWing { span: 4.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let settings = PreconditionerSettings::default();

        let preconditioner = SsorPreconditioner::build(hierarchy.finest(), &kelvin, &settings, 1e-3);

        let n = 1 + hierarchy.finest().loops.len() + kelvin.number_of_groups;
        let mut residual = vec![0.0; n];
        let base_region_id = (1..=hierarchy.finest().loops.len())
            .find(|&id| kelvin.is_base_region(id))
            .unwrap();
        residual[base_region_id] = 7.0;

        let solved = preconditioner.apply(&residual).unwrap();
        assert_eq!(solved[base_region_id], 7.0);
    }
}
