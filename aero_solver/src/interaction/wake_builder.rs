// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The wake-on-wake analogue of [`super::builder`] (§4.D, §4.I step 4): target = a point (a
//! surface control point or another wake node), source = a wake sheet's strands, each already
//! carrying its own multi-level binary agglomeration ([`crate::wake::strand::Strand::levels`]).
//! The descent is the same coarse-to-fine idea as the surface grid hierarchy, just walked
//! per-strand instead of through [`crate::geometry::GridHierarchy`].

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::wake::sheet::WakeSheet;
use crate::wake::strand::Strand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One admissible wake source: a single segment of `strand_index`'s strand, at agglomeration
/// `level` (`0` is finest), `segment_index` into that level's position/circulation arrays.
pub struct WakeSourceRef {
    pub strand_index: usize,
    pub level: usize,
    pub segment_index: usize,
}

/// Builds the wake interaction list for one target point by descending every strand's
/// agglomeration from its coarsest level, stopping at the first admissible level per branch. Only
/// descends into segments whose entire finest-level span is live (`Strand::live_segment_count`);
/// a coarse segment straddling the live/not-yet-grown boundary is excluded on either side rather
/// than lumping a not-yet-advected tail in with real circulation.
pub fn build_wake_interaction_list_for_target(
    sheet: &WakeSheet,
    target: SpatialVector,
    far_factor: Float,
) -> Vec<WakeSourceRef> {
    let mut out = Vec::new();

    for (strand_index, strand) in sheet.strands.iter().enumerate() {
        let coarsest = strand.levels.len() - 1;
        let live_at_coarsest = live_count_at_level(strand, coarsest);

        for segment_index in 0..live_at_coarsest {
            descend_strand(strand, strand_index, coarsest, segment_index, target, far_factor, &mut out);
        }
    }

    out
}

/// How many of a level's segments are entirely within the strand's live prefix: halves each level
/// coarser, matching [`Strand::build_agglomeration`]'s pairing.
fn live_count_at_level(strand: &Strand, level: usize) -> usize {
    let mut live = strand.live_segment_count;
    for _ in 0..level {
        live /= 2;
    }
    live
}

fn descend_strand(
    strand: &Strand,
    strand_index: usize,
    level: usize,
    segment_index: usize,
    target: SpatialVector,
    far_factor: Float,
    out: &mut Vec<WakeSourceRef>,
) {
    let data = &strand.levels[level];
    let a = data.positions[segment_index];
    let b = data.positions[segment_index + 1];
    let length = (b - a).length();
    let midpoint = (a + b) * 0.5;

    let admissible = length > 0.0 && far_factor * length <= (target - midpoint).length();

    if level == 0 || admissible {
        out.push(WakeSourceRef { strand_index, level, segment_index });
        return;
    }

    let child_live = live_count_at_level(strand, level - 1);
    let left = 2 * segment_index;
    let right = 2 * segment_index + 1;

    if left < child_live {
        descend_strand(strand, strand_index, level - 1, left, target, far_factor, out);
    }
    if right < child_live {
        descend_strand(strand, strand_index, level - 1, right, target, far_factor, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wake::sheet::WakeSheet;

    fn sheet_with_one_long_strand() -> WakeSheet {
        let mut strand =
            Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 8);
        strand.levels[0].segment_circulation = vec![1.0; 8];
        strand.build_agglomeration();
        WakeSheet { strands: vec![strand], common_te_pairs: vec![] }
    }

    #[test]
    fn test_far_target_uses_a_coarse_level() {
        let sheet = sheet_with_one_long_strand();
        let list = build_wake_interaction_list_for_target(&sheet, SpatialVector::new(0.0, 0.0, 100.0), 5.0);

        assert!(!list.is_empty());
        assert!(list.iter().any(|s| s.level > 0));
    }

    #[test]
    fn test_near_target_descends_to_finest_level() {
        let sheet = sheet_with_one_long_strand();
        let list = build_wake_interaction_list_for_target(&sheet, SpatialVector::new(0.05, 0.0, 0.001), 5.0);

        assert!(list.iter().all(|s| s.level == 0));
    }

    #[test]
    fn test_not_yet_live_strand_contributes_nothing() {
        let mut strand =
            Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 8);
        strand.live_segment_count = 0;
        strand.levels[0].segment_circulation = vec![1.0; 8];
        strand.build_agglomeration();

        let sheet = WakeSheet { strands: vec![strand], common_te_pairs: vec![] };
        let list = build_wake_interaction_list_for_target(&sheet, SpatialVector::new(3.0, 4.0, 5.0), 5.0);

        assert!(list.is_empty());
    }

    #[test]
    fn test_list_covers_every_finest_segment_exactly_once() {
        let sheet = sheet_with_one_long_strand();
        let list = build_wake_interaction_list_for_target(&sheet, SpatialVector::new(3.0, 4.0, 5.0), 5.0);

        let mut finest_covered = 0usize;
        for source in &list {
            finest_covered += 1usize << source.level;
        }

        assert_eq!(finest_covered, 8);
    }
}
