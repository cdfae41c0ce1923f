// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Block-LU preconditioner (§4.F): the finest-level loops are partitioned into blocks of roughly
//! [`crate::config::PreconditionerSettings::target_block_size`] by picking the coarse hierarchy
//! level whose loop count is closest to that target and using each coarse loop's descendants as
//! one block. Each block's dense self-influence matrix is LU-factorized once and reused every
//! GMRES iteration.

use rayon::prelude::*;

use aero_math::matrix::linalg::LuFactorization;
use aero_math::matrix::Matrix;
use aero_math::type_aliases::Float;

use crate::config::PreconditionerSettings;
use crate::error::Error;
use crate::geometry::kelvin::KelvinGroups;
use crate::geometry::{GridHierarchy, Index};
use crate::vortex::segment::induced_velocity_of_segment;

use super::Preconditioner;

/// One agglomerated block: the finest-level loop indices (1-based) it owns, and the LU
/// factorization of its dense self-influence matrix.
struct Block {
    loop_ids: Vec<Index>,
    factorization: LuFactorization,
}

pub struct BlockPreconditioner {
    blocks: Vec<Block>,
    number_of_loops: usize,
    number_of_kelvin_groups: usize,
}

/// Picks the hierarchy level whose loop count is within `tolerance` of `target`, preferring the
/// coarsest such level (fewer, larger blocks factorize faster). Falls back to the coarsest level
/// available if none satisfies the tolerance exactly.
fn pick_agglomeration_level(hierarchy: &GridHierarchy, settings: &PreconditionerSettings) -> usize {
    let target = settings.target_block_size as Float;

    for level in (1..=hierarchy.number_of_levels()).rev() {
        let count = hierarchy.level(level).loops.len() as Float;
        if count > 0.0 && count <= target * settings.block_size_tolerance {
            return level;
        }
    }

    hierarchy.number_of_levels()
}

/// Recursively collects every finest-level descendant of `loop_id` at `level`.
fn collect_finest_descendants(hierarchy: &GridHierarchy, level: usize, loop_id: Index, out: &mut Vec<Index>) {
    if level == 1 {
        out.push(loop_id);
        return;
    }

    for &child in &hierarchy.level(level).get_loop(loop_id).fine_children {
        collect_finest_descendants(hierarchy, level - 1, child, out);
    }
}

impl BlockPreconditioner {
    /// Builds one LU-factorized block per coarse loop at the chosen agglomeration level, using a
    /// dense direct Biot-Savart evaluation of the self-influence (the blocks are small enough that
    /// this is cheaper than threading the hierarchical interaction lists through a sub-assembly).
    pub fn build(
        hierarchy: &GridHierarchy,
        kelvin: &KelvinGroups,
        settings: &PreconditionerSettings,
        viscous_core_length: Float,
    ) -> Result<Self, Error> {
        let level = pick_agglomeration_level(hierarchy, settings);
        let coarse = hierarchy.level(level);
        let finest = hierarchy.finest();

        let blocks: Vec<Block> = coarse
            .loops
            .par_iter()
            .enumerate()
            .map(|(coarse_index, _)| {
                let mut loop_ids = Vec::new();
                collect_finest_descendants(hierarchy, level, coarse_index + 1, &mut loop_ids);
                assemble_block(finest, kelvin, &loop_ids, viscous_core_length)
            })
            .collect::<Result<Vec<Block>, Error>>()?;

        Ok(Self {
            blocks,
            number_of_loops: finest.loops.len(),
            number_of_kelvin_groups: kelvin.number_of_groups,
        })
    }
}

fn assemble_block(
    finest: &crate::geometry::GridLevel,
    kelvin: &KelvinGroups,
    loop_ids: &[Index],
    viscous_core_length: Float,
) -> Result<Block, Error> {
    let n = loop_ids.len();
    let mut matrix = Matrix::new_default([n, n]);

    // The distinct edges touched by any loop in this block; an edge's own circulation is the
    // difference of its two adjacent loops' circulations (invariant 1), so each edge needs
    // visiting only once per row, not once per adjacent loop.
    let mut block_edges: Vec<Index> = loop_ids
        .iter()
        .flat_map(|&id| finest.get_loop(id).edges.iter().copied())
        .collect();
    block_edges.sort_unstable();
    block_edges.dedup();

    for (row, &target_id) in loop_ids.iter().enumerate() {
        let target_loop = finest.get_loop(target_id);

        if kelvin.is_base_region(target_id) {
            matrix[[row, row]] = 1.0;
            continue;
        }

        for &edge_id in &block_edges {
            let edge = finest.edge(edge_id);

            let left_col = loop_ids.iter().position(|&id| id == edge.left_loop);
            let right_col = loop_ids.iter().position(|&id| id == edge.right_loop);

            if left_col.is_none() && right_col.is_none() {
                continue;
            }

            let p1 = finest.node(edge.nodes[0]).position;
            let p2 = finest.node(edge.nodes[1]).position;

            if let Ok(unit_velocity) =
                induced_velocity_of_segment(p1, p2, target_loop.centroid, viscous_core_length)
            {
                let value = unit_velocity.dot(target_loop.normal);

                if let Some(col) = left_col {
                    matrix[[row, col]] += value;
                }
                if let Some(col) = right_col {
                    matrix[[row, col]] -= value;
                }
            }
        }
    }

    let factorization = matrix
        .lu_factorize()
        .map_err(|message| Error::BadHierarchy(format!("preconditioner block failed to factorize: {}", message)))?;

    Ok(Block { loop_ids: loop_ids.to_vec(), factorization })
}

impl Preconditioner for BlockPreconditioner {
    /// Applies each block's inverse to its slice of the residual; the Kelvin-constraint rows at
    /// the tail of the augmented vector pass through unchanged (the constraint rows are already
    /// well-conditioned and do not benefit from block-LU scaling).
    fn apply(&self, residual: &[Float]) -> Result<Vec<Float>, Error> {
        let expected_len = 1 + self.number_of_loops + self.number_of_kelvin_groups;
        if residual.len() != expected_len {
            return Err(Error::BadHierarchy(format!(
                "preconditioner residual length {} does not match expected {}",
                residual.len(),
                expected_len
            )));
        }

        let mut out = residual.to_vec();

        for block in &self.blocks {
            let rhs: Vec<Float> = block.loop_ids.iter().map(|&id| residual[id]).collect();
            let solved = block.factorization.solve(&rhs);

            for (&id, value) in block.loop_ids.iter().zip(solved.into_iter()) {
                out[id] = value;
            }
        }

        Ok(out)
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
    fn test_build_produces_one_block_per_coarse_loop_on_single_level_mesh() {
        let wing = FlatRectangularWing { span: 4.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());

        let mut settings = PreconditionerSettings::default();
        settings.target_block_size = 100;

        let preconditioner = BlockPreconditioner::build(&hierarchy, &kelvin, &settings, 1e-3).unwrap();
        // Single-level hierarchy: the "coarse" level is the finest level itself, one block per
        // loop.
        assert_eq!(preconditioner.blocks.len(), hierarchy.finest().loops.len());
    }

    #[test]
    fn test_apply_preserves_vector_length() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 1 };
        let hierarchy = wing.build_hierarchy().unwrap();
        let kelvin = build_kelvin_groups(hierarchy.finest(), SpatialVector::unit_x());
        let settings = PreconditionerSettings::default();

        let preconditioner = BlockPreconditioner::build(&hierarchy, &kelvin, &settings, 1e-3).unwrap();

        let n = 1 + hierarchy.finest().loops.len() + kelvin.number_of_groups;
        let residual = vec![1.0; n];
        let solved = preconditioner.apply(&residual).unwrap();

        assert_eq!(solved.len(), n);
    }
}
