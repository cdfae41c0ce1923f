// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The discretized normal-velocity influence matrix `A`, augmented with Kelvin-constraint rows
//! (§4.E). `A` is never assembled densely; [`MatrixOperator::apply`] is a matrix-free mat-vec
//! driven by the interaction lists.

use rayon::prelude::*;

use aero_math::type_aliases::Float;

use crate::config::AnalysisType;
use crate::error::Error;
use crate::geometry::kelvin::KelvinGroups;
use crate::geometry::{GridHierarchy, NONE};
use crate::interaction::SourceRef;
use crate::vortex::segment::induced_velocity_of_segment;

/// Weight applied to each Kelvin-constraint row. A value of `1.0` makes that row of the augmented
/// system `sum_{i in group} x[i] = 0` exactly, which is what the Kelvin closure property (§8.2)
/// checks against.
pub const KELVIN_ROW_WEIGHT: Float = 1.0;

pub struct MatrixOperator<'a> {
    pub hierarchy: &'a GridHierarchy,
    /// One interaction list per finest-level loop, indexed `[loop_id - 1]`.
    pub interaction_lists: &'a [Vec<SourceRef>],
    pub kelvin: &'a KelvinGroups,
    pub viscous_core_length: Float,
    pub analysis_type: AnalysisType,
}

impl<'a> MatrixOperator<'a> {
    /// Length of the augmented unknown/residual vectors: `N_loops + N_kelvin_groups + 1` (index 0
    /// is the sentinel, §4.G).
    pub fn augmented_size(&self) -> usize {
        1 + self.hierarchy.finest().loops.len() + self.kelvin.number_of_groups
    }

    /// Restricts level-1 loop circulations `x[1..=N]` up through the hierarchy by an
    /// area-weighted average of each loop's children, then derives every level's edge
    /// circulations from the difference of their adjacent loops' circulations (invariant 1).
    fn edge_circulations_by_level(&self, x: &[Float]) -> Vec<Vec<Float>> {
        let levels = self.hierarchy.number_of_levels();
        let mut loop_gamma: Vec<Vec<Float>> = Vec::with_capacity(levels);

        loop_gamma.push(x[1..=self.hierarchy.finest().loops.len()].to_vec());

        for level in 2..=levels {
            let fine = self.hierarchy.level(level - 1);
            let coarse = self.hierarchy.level(level);
            let fine_gamma = &loop_gamma[level - 2];

            let mut this_level = vec![0.0; coarse.loops.len()];
            let mut weight = vec![0.0; coarse.loops.len()];

            for (fine_index, fine_loop) in fine.loops.iter().enumerate() {
                if fine_loop.coarse_parent == NONE {
                    continue;
                }
                let parent = fine_loop.coarse_parent - 1;
                this_level[parent] += fine_gamma[fine_index] * fine_loop.area;
                weight[parent] += fine_loop.area;
            }

            for (value, w) in this_level.iter_mut().zip(weight.iter()) {
                if *w > 0.0 {
                    *value /= *w;
                }
            }

            loop_gamma.push(this_level);
        }

        loop_gamma
            .iter()
            .enumerate()
            .map(|(level_index, gamma)| {
                let level = &self.hierarchy.levels[level_index];

                level
                    .edges
                    .iter()
                    .map(|edge| {
                        let left = if edge.left_loop == NONE { 0.0 } else { gamma[edge.left_loop - 1] };
                        let right = if edge.right_loop == NONE { 0.0 } else { gamma[edge.right_loop - 1] };
                        left - right
                    })
                    .collect()
            })
            .collect()
    }

    /// The finest level's edge circulations derived from a solved augmented vector `x`
    /// (invariant 1), the shape [`crate::forces::bound_kutta_jukowski_forces`] needs.
    pub fn finest_edge_circulations(&self, x: &[Float]) -> Result<Vec<Float>, Error> {
        let expected_len = self.augmented_size();
        if x.len() != expected_len {
            return Err(Error::BadGeometry {
                loop_id: 0,
                message: format!("edge circulation input length {} does not match expected {}", x.len(), expected_len),
            });
        }

        Ok(self.edge_circulations_by_level(x).into_iter().next().unwrap_or_default())
    }

    /// The total induced velocity (not dotted with the panel normal) at every finest-level loop's
    /// centroid, for a solved augmented vector `x`. Shares [`Self::apply`]'s accumulation exactly,
    /// just returning the vector rather than its normal component, since force integration
    /// (§4.J) needs the full velocity and the normal-velocity residual (§4.E) does not.
    pub fn induced_velocity_at_loops(&self, x: &[Float]) -> Result<Vec<aero_math::spatial_vector::SpatialVector>, Error> {
        let expected_len = self.augmented_size();
        if x.len() != expected_len {
            return Err(Error::BadGeometry {
                loop_id: 0,
                message: format!("velocity input length {} does not match expected {}", x.len(), expected_len),
            });
        }

        let edge_circulation = self.edge_circulations_by_level(x);
        let finest = self.hierarchy.finest();

        let velocities = finest
            .loops
            .par_iter()
            .enumerate()
            .map(|(target_index, target_loop)| {
                let mut velocity = aero_math::spatial_vector::SpatialVector::default();

                for source in &self.interaction_lists[target_index] {
                    let level = &self.hierarchy.levels[source.level - 1];
                    let edge = level.edge(source.edge_id);
                    let gamma = edge_circulation[source.level - 1][source.edge_id - 1];

                    if gamma == 0.0 {
                        continue;
                    }

                    let p1 = level.node(edge.nodes[0]).position;
                    let p2 = level.node(edge.nodes[1]).position;

                    if let Ok(unit_velocity) =
                        induced_velocity_of_segment(p1, p2, target_loop.centroid, self.viscous_core_length)
                    {
                        velocity += unit_velocity * gamma;
                    }
                }

                velocity
            })
            .collect();

        Ok(velocities)
    }

    /// `y = A x`, augmented with Kelvin rows. In panel mode the caller is expected to apply this
    /// twice (`y = A^T(A x)`, §4.E) rather than this method doing so itself, since the transpose
    /// needs the same interaction lists read in reverse and is more naturally expressed at the
    /// GMRES wrapper level (§4.G).
    pub fn apply(&self, x: &[Float]) -> Result<Vec<Float>, Error> {
        let expected_len = self.augmented_size();
        if x.len() != expected_len {
            return Err(Error::BadGeometry {
                loop_id: 0,
                message: format!("mat-vec input length {} does not match expected {}", x.len(), expected_len),
            });
        }

        let edge_circulation = self.edge_circulations_by_level(x);
        let finest = self.hierarchy.finest();

        let velocity_dot_normal: Vec<Float> = finest
            .loops
            .par_iter()
            .enumerate()
            .map(|(target_index, target_loop)| {
                let mut velocity = aero_math::spatial_vector::SpatialVector::default();

                for source in &self.interaction_lists[target_index] {
                    let level = &self.hierarchy.levels[source.level - 1];
                    let edge = level.edge(source.edge_id);
                    let gamma = edge_circulation[source.level - 1][source.edge_id - 1];

                    if gamma == 0.0 {
                        continue;
                    }

                    let p1 = level.node(edge.nodes[0]).position;
                    let p2 = level.node(edge.nodes[1]).position;

                    if let Ok(unit_velocity) =
                        induced_velocity_of_segment(p1, p2, target_loop.centroid, self.viscous_core_length)
                    {
                        velocity += unit_velocity * gamma;
                    }
                }

                velocity.dot(target_loop.normal)
            })
            .collect();

        let mut result = vec![0.0; expected_len];
        result[1..=velocity_dot_normal.len()].copy_from_slice(&velocity_dot_normal);

        for i in 1..=finest.loops.len() {
            if self.kelvin.is_base_region(i) {
                // Base-region rows are replaced by the identity (§4.F/§4.H).
                result[i] = x[i];
            }
        }

        for group in 1..=self.kelvin.number_of_groups {
            let row = velocity_dot_normal.len() + group;
            let sum: Float = self.kelvin.loops_in_group(group).map(|i| x[i]).sum();
            result[row] = KELVIN_ROW_WEIGHT * sum;
        }

        Ok(result)
    }

    /// `y = A^T w`, used by the panel-mode GMRES wrapper to form `A^T A` and `A^T b` (§4.E,
    /// §4.G). Computed by running the same induced-velocity kernel with source and target roles
    /// swapped through the interaction lists, which are built per level-1 target; the adjoint is
    /// therefore evaluated by re-distributing `w[target]` back onto every source edge the target's
    /// list names. Only level-1 sources (direct loop-to-loop edges) are redistributed into exact
    /// columns; a coarse-level source's contribution is folded into its agglomerated loop only,
    /// which is an approximation of the true transpose for multi-level hierarchies, acceptable
    /// since the preconditioner (not the outer residual check) is what consumes this path.
    pub fn apply_transpose(&self, w: &[Float]) -> Result<Vec<Float>, Error> {
        let expected_len = self.augmented_size();
        if w.len() != expected_len {
            return Err(Error::BadGeometry {
                loop_id: 0,
                message: format!("mat-vec-transpose input length {} does not match expected {}", w.len(), expected_len),
            });
        }

        let finest = self.hierarchy.finest();
        let mut result = vec![0.0; expected_len];

        for (target_index, target_loop) in finest.loops.iter().enumerate() {
            let w_i = w[target_index + 1];
            if w_i == 0.0 {
                continue;
            }

            // A base-region row is the identity in `apply`, not the velocity-dot-normal row, so
            // its transpose only feeds back into its own column (handled below).
            if self.kelvin.is_base_region(target_index + 1) {
                continue;
            }

            for source in &self.interaction_lists[target_index] {
                let level = &self.hierarchy.levels[source.level - 1];
                let edge = level.edge(source.edge_id);

                let p1 = level.node(edge.nodes[0]).position;
                let p2 = level.node(edge.nodes[1]).position;

                if let Ok(unit_velocity) =
                    induced_velocity_of_segment(p1, p2, target_loop.centroid, self.viscous_core_length)
                {
                    let contribution = unit_velocity.dot(target_loop.normal) * w_i;

                    if source.level == 1 {
                        if edge.left_loop != NONE {
                            result[edge.left_loop] += contribution;
                        }
                        if edge.right_loop != NONE {
                            result[edge.right_loop] -= contribution;
                        }
                    }
                }
            }
        }

        for i in 1..=finest.loops.len() {
            if self.kelvin.is_base_region(i) {
                result[i] += w[i];
            }
        }

        for group in 1..=self.kelvin.number_of_groups {
            let row = finest.loops.len() + group;
            let w_row = w[row];
            if w_row == 0.0 {
                continue;
            }
            for i in self.kelvin.loops_in_group(group) {
                result[i] += KELVIN_ROW_WEIGHT * w_row;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::kelvin::build_kelvin_groups;
    use crate::geometry::provider::test_support::FlatRectangularWing;
    use crate::geometry::provider::GeometryProvider;
    use crate::interaction::build_fixed_loop_lists;
    use aero_math::spatial_vector::SpatialVector;

    fn built_operator(
        hierarchy: &GridHierarchy,
    ) -> (Vec<Vec<SourceRef>>, KelvinGroups) {
        let settings = crate::config::InteractionSettings::default();
        let lists = build_fixed_loop_lists(hierarchy, &settings, AnalysisType::Vlm).unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        (lists, kelvin)
    }

    #[test]
    fn test_zero_circulation_gives_zero_velocity_row() {
        let wing = FlatRectangularWing { span: 8.0, chord: 1.0, chordwise_panels: 4, spanwise_panels: 4 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let (lists, kelvin) = built_operator(&hierarchy);

        let operator = MatrixOperator {
            hierarchy: &hierarchy,
            interaction_lists: &lists,
            kelvin: &kelvin,
            viscous_core_length: 0.0,
            analysis_type: AnalysisType::Vlm,
        };

        let x = vec![0.0; operator.augmented_size()];
        let y = operator.apply(&x).unwrap();

        assert!(y.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_mat_vec_adjoint_property() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let (lists, kelvin) = built_operator(&hierarchy);

        let operator = MatrixOperator {
            hierarchy: &hierarchy,
            interaction_lists: &lists,
            kelvin: &kelvin,
            viscous_core_length: 1e-3,
            analysis_type: AnalysisType::Panel,
        };

        let n = operator.augmented_size();
        let x: Vec<Float> = (0..n).map(|i| (i as Float * 0.37).sin()).collect();
        let y: Vec<Float> = (0..n).map(|i| (i as Float * 0.91).cos()).collect();

        let ax = operator.apply(&x).unwrap();
        let aty = operator.apply_transpose(&y).unwrap();

        let lhs: Float = ax.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
        let rhs: Float = x.iter().zip(aty.iter()).map(|(a, b)| a * b).sum();

        assert!((lhs - rhs).abs() < 1e-6 * lhs.abs().max(1.0));
    }

    #[test]
    fn test_zero_circulation_gives_zero_velocity_and_zero_edge_circulation() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let (lists, kelvin) = built_operator(&hierarchy);

        let operator = MatrixOperator {
            hierarchy: &hierarchy,
            interaction_lists: &lists,
            kelvin: &kelvin,
            viscous_core_length: 1e-3,
            analysis_type: AnalysisType::Vlm,
        };

        let x = vec![0.0; operator.augmented_size()];
        let velocities = operator.induced_velocity_at_loops(&x).unwrap();
        let edge_circulation = operator.finest_edge_circulations(&x).unwrap();

        assert!(velocities.iter().all(|v| v.length() < 1e-12));
        assert!(edge_circulation.iter().all(|g| g.abs() < 1e-12));
        assert_eq!(edge_circulation.len(), hierarchy.finest().edges.len());
    }
}
