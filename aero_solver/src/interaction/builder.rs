// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Per-target interaction-list construction (§4.D): the coarse-to-fine descent, the near-field
//! vetoes, and the backward sweep that promotes a common subset of children's sources up to their
//! parent.

use rayon::prelude::*;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::config::{AnalysisType, InteractionSettings};
use crate::error::Error;
use crate::geometry::{GridHierarchy, Index, Loop, NONE};

use super::admissibility::{is_admissible, veto_opposite_facing, veto_same_surface_near_coplanar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// One admissible source, collapsed to the coarsest level at which it satisfies the admissibility
/// test.
pub struct SourceRef {
    pub level: usize,
    pub edge_id: Index,
}

/// Recursion depth at which [`descend`] gives up and reports a bad hierarchy rather than looping
/// forever: a sound hierarchy never needs more levels than [`GridHierarchy::number_of_levels`], so
/// this is only ever hit by a parent/child cycle.
const MAX_DESCENT_DEPTH: usize = 64;

/// The per-target parameters the near-field vetoes need (§4.D); bundled so `descend` does not
/// have to carry five loose arguments through its recursion.
struct DescentContext<'a> {
    settings: &'a InteractionSettings,
    analysis_type: AnalysisType,
    exclude_component: Option<usize>,
    target_normal: Option<SpatialVector>,
    target_reference_length: Float,
}

fn is_vetoed(target: SpatialVector, source: &Loop, ctx: &DescentContext) -> bool {
    match (ctx.exclude_component, ctx.target_normal) {
        (Some(exclude_component), Some(_)) if ctx.analysis_type == AnalysisType::Vlm => {
            veto_same_surface_near_coplanar(target, exclude_component, source, ctx.settings)
        }
        (Some(_), Some(target_normal)) if ctx.analysis_type == AnalysisType::Panel => {
            veto_opposite_facing(target, target_normal, source, ctx.target_reference_length, ctx.settings)
        }
        _ => false,
    }
}

/// Builds the interaction list for one target point by descending the grid hierarchy from its
/// coarsest level, stopping at the first admissible level for each branch.
///
/// `exclude_component` and `target_normal`, when both `Some`, apply the near-field vetoes (§4.D):
/// `exclude_component` feeds the VLM same-surface-near-coplanar veto and `target_normal` (together
/// with `target_reference_length`) feeds the panel-mode opposite-facing veto. Pass `None` for both
/// to skip them (e.g. when building wake-on-wake lists, which have their own veto rules not
/// modeled here).
#[allow(clippy::too_many_arguments)]
pub fn build_interaction_list_for_target(
    hierarchy: &GridHierarchy,
    target: SpatialVector,
    settings: &InteractionSettings,
    analysis_type: AnalysisType,
    exclude_component: Option<usize>,
    target_normal: Option<SpatialVector>,
    target_reference_length: Float,
) -> Result<Vec<SourceRef>, Error> {
    let ctx = DescentContext { settings, analysis_type, exclude_component, target_normal, target_reference_length };

    let mut out = Vec::new();
    let coarsest = hierarchy.number_of_levels();
    let far_factor = settings.far_factor();

    for loop_id in 1..=hierarchy.level(coarsest).loops.len() {
        descend(hierarchy, coarsest, loop_id, target, far_factor, &ctx, 0, &mut out)?;
    }

    out.sort_unstable();
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn descend(
    hierarchy: &GridHierarchy,
    level: usize,
    loop_id: Index,
    target: SpatialVector,
    far_factor: Float,
    ctx: &DescentContext,
    depth: usize,
    out: &mut Vec<SourceRef>,
) -> Result<(), Error> {
    if depth > MAX_DESCENT_DEPTH {
        return Err(Error::BadHierarchy(format!(
            "interaction list descent exceeded depth {}, likely a parent/child cycle",
            MAX_DESCENT_DEPTH
        )));
    }

    let grid_level = hierarchy.level(level);
    let candidate = grid_level.get_loop(loop_id);

    if level == 1 || is_admissible(grid_level, target, candidate, far_factor) {
        if is_vetoed(target, candidate, ctx) {
            return Ok(());
        }

        for &edge_id in &candidate.edges {
            out.push(SourceRef { level, edge_id });
        }
        return Ok(());
    }

    for &child in &candidate.fine_children {
        descend(hierarchy, level - 1, child, target, far_factor, ctx, depth + 1, out)?;
    }

    Ok(())
}

/// Builds interaction lists for every level-1 loop's centroid in parallel (owner-computes: each
/// target index is written by exactly one worker), matching the fork-join loop shape used
/// throughout the rest of the solver (§5), then runs the backward-sweep promotion (invariant 5)
/// bottom-up over the rest of the hierarchy.
pub fn build_fixed_loop_lists(
    hierarchy: &GridHierarchy,
    settings: &InteractionSettings,
    analysis_type: AnalysisType,
) -> Result<Vec<Vec<SourceRef>>, Error> {
    let raw: Vec<Vec<SourceRef>> = hierarchy
        .finest()
        .loops
        .par_iter()
        .map(|target_loop| {
            build_interaction_list_for_target(
                hierarchy,
                target_loop.centroid,
                settings,
                analysis_type,
                Some(target_loop.component_id),
                Some(target_loop.normal),
                target_loop.characteristic_length(),
            )
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(promote_common_sources(hierarchy, raw, settings.far_factor()))
}

/// The backward sweep (§4.D, invariant 5): given the already-built lists of every child of one
/// coarse parent, compute the intersection (exploiting the sorted invariant for an O(sum
/// |children|) merge), remove it from every child, and return it as the parent's promoted list.
/// Promotion must still be validated by the caller against the documented minimum-distance rule
/// before being accepted, since that rule needs geometry this function does not have access to.
pub fn intersect_and_remove(children: &mut [Vec<SourceRef>]) -> Vec<SourceRef> {
    if children.is_empty() {
        return Vec::new();
    }

    let mut common = children[0].clone();

    for child in &children[1..] {
        common.retain(|item| child.binary_search(item).is_ok());
    }

    if common.is_empty() {
        return common;
    }

    for child in children.iter_mut() {
        child.retain(|item| common.binary_search(item).is_err());
    }

    common
}

/// Filters `common` down to the sources whose promotion to `parent` satisfies the minimum-distance
/// guard (§4.D): promoting is only valid if every child stays at least
/// `far_factor * max(child-to-parent centroid distance)` away from the promoted source, here
/// measured from the source edge's midpoint.
fn promotable_sources(
    hierarchy: &GridHierarchy,
    parent: &Loop,
    children: &[&Loop],
    common: &[SourceRef],
    far_factor: Float,
) -> Vec<SourceRef> {
    let max_child_to_parent_distance =
        children.iter().map(|child| (child.centroid - parent.centroid).length()).fold(0.0, Float::max);

    common
        .iter()
        .copied()
        .filter(|source| {
            let source_level = hierarchy.level(source.level);
            let edge = source_level.edge(source.edge_id);
            let midpoint = (source_level.node(edge.nodes[0]).position + source_level.node(edge.nodes[1]).position) * 0.5;

            let min_child_distance = children
                .iter()
                .map(|child| (child.centroid - midpoint).length())
                .fold(aero_math::consts::INFINITY, Float::min);

            min_child_distance >= far_factor * max_child_to_parent_distance
        })
        .collect()
}

/// Runs the backward sweep bottom-up over every level above the finest, reconstructing each
/// finest-level target's effective list as its own residual plus every ancestor's validated
/// promoted set.
fn promote_common_sources(
    hierarchy: &GridHierarchy,
    finest_lists: Vec<Vec<SourceRef>>,
    far_factor: Float,
) -> Vec<Vec<SourceRef>> {
    let levels = hierarchy.number_of_levels();

    // `current[level - 1]` holds every level-`level` loop's own (possibly reduced) list.
    let mut current: Vec<Vec<Vec<SourceRef>>> = Vec::with_capacity(levels);
    current.push(finest_lists);
    for level in 2..=levels {
        current.push(vec![Vec::new(); hierarchy.level(level).loops.len()]);
    }

    for level in 2..=levels {
        let parent_level = hierarchy.level(level);

        for (parent_index, parent_loop) in parent_level.loops.iter().enumerate() {
            if parent_loop.fine_children.is_empty() {
                continue;
            }

            let child_loops: Vec<&Loop> =
                parent_loop.fine_children.iter().map(|&child_id| hierarchy.level(level - 1).get_loop(child_id)).collect();

            let mut child_lists: Vec<Vec<SourceRef>> =
                parent_loop.fine_children.iter().map(|&child_id| std::mem::take(&mut current[level - 2][child_id - 1])).collect();

            let common = intersect_and_remove(&mut child_lists);
            let promoted = promotable_sources(hierarchy, parent_loop, &child_loops, &common, far_factor);

            // Anything common but rejected by the distance guard goes back to every child
            // unchanged, as if it had never been a promotion candidate.
            if promoted.len() != common.len() {
                let demoted: Vec<SourceRef> = common.into_iter().filter(|s| !promoted.contains(s)).collect();
                for child_list in child_lists.iter_mut() {
                    child_list.extend(demoted.iter().copied());
                    child_list.sort_unstable();
                }
            }

            for (&child_id, child_list) in parent_loop.fine_children.iter().zip(child_lists.into_iter()) {
                current[level - 2][child_id - 1] = child_list;
            }

            current[level - 1][parent_index] = promoted;
        }
    }

    let finest = hierarchy.finest();
    let mut result = Vec::with_capacity(finest.loops.len());

    for (index, finest_loop) in finest.loops.iter().enumerate() {
        let mut list = current[0][index].clone();

        let mut level = 1;
        let mut parent = finest_loop.coarse_parent;

        while parent != NONE && level < levels {
            level += 1;
            list.extend(current[level - 1][parent - 1].iter().copied());
            parent = hierarchy.level(level).get_loop(parent).coarse_parent;
        }

        list.sort_unstable();
        result.push(list);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::provider::test_support::FlatRectangularWing;
    use crate::geometry::provider::GeometryProvider;

    #[test]
    fn test_single_level_hierarchy_always_uses_finest_level() {
        let wing = FlatRectangularWing { span: 8.0, chord: 1.0, chordwise_panels: 4, spanwise_panels: 4 };
        let hierarchy = wing.build_hierarchy().unwrap();

        let settings = InteractionSettings::default();
        let target = hierarchy.finest().loops[0].centroid;
        let list =
            build_interaction_list_for_target(&hierarchy, target, &settings, AnalysisType::Vlm, None, None, 1.0).unwrap();

        assert!(!list.is_empty());
        assert!(list.iter().all(|s| s.level == 1));
    }

    #[test]
    fn test_fixed_loop_lists_have_one_entry_per_finest_loop() {
        let wing = FlatRectangularWing { span: 8.0, chord: 1.0, chordwise_panels: 4, spanwise_panels: 4 };
        let hierarchy = wing.build_hierarchy().unwrap();

        let settings = InteractionSettings::default();
        let lists = build_fixed_loop_lists(&hierarchy, &settings, AnalysisType::Vlm).unwrap();

        assert_eq!(lists.len(), hierarchy.finest().loops.len());
    }

    #[test]
    fn test_intersect_and_remove_extracts_common_sources() {
        let mut children = vec![
            vec![SourceRef { level: 1, edge_id: 1 }, SourceRef { level: 1, edge_id: 2 }],
            vec![SourceRef { level: 1, edge_id: 2 }, SourceRef { level: 1, edge_id: 3 }],
        ];

        let promoted = intersect_and_remove(&mut children);

        assert_eq!(promoted, vec![SourceRef { level: 1, edge_id: 2 }]);
        assert_eq!(children[0], vec![SourceRef { level: 1, edge_id: 1 }]);
        assert_eq!(children[1], vec![SourceRef { level: 1, edge_id: 3 }]);
    }

    #[test]
    fn test_intersect_and_remove_empty_input() {
        let mut children: Vec<Vec<SourceRef>> = vec![];
        assert!(intersect_and_remove(&mut children).is_empty());
    }
}
