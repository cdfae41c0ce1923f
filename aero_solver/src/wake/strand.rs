// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! A single trailing strand (§4.C): `K = 2^k` level-1 segments rooted at one trailing-edge node,
//! with a multi-level binary agglomeration on top so the wake-on-wake interaction list builder can
//! treat distant segments as one coarser segment, the same way the surface grid hierarchy does for
//! panels.

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::config::WakeRollUpMode;
use crate::error::Error;

/// One agglomeration level of a strand: `positions.len() == segments.len() + 1`, matching the
/// node/edge relationship of a 1D polyline.
#[derive(Debug, Clone, Default)]
pub struct StrandLevel {
    pub positions: Vec<SpatialVector>,
    pub velocities: Vec<SpatialVector>,
    pub segment_circulation: Vec<Float>,
}

#[derive(Debug, Clone)]
pub struct Strand {
    pub levels: Vec<StrandLevel>,
    /// How many of the finest level's segments are "live" (unsteady mode grows this by one each
    /// step; steady mode keeps it at `max_segments` at all times).
    pub live_segment_count: usize,
    pub max_segments: usize,
}

impl Strand {
    /// Creates a strand with every node pinned at `root` and every segment aligned with
    /// `free_stream_direction * segment_length`, fully live (steady-mode initial condition; an
    /// unsteady run starts this at `live_segment_count = 0` and grows it, see
    /// [`Strand::grow_live_prefix`]).
    pub fn new_pinned_to_free_stream(
        root: SpatialVector,
        free_stream_direction: SpatialVector,
        segment_length: Float,
        max_segments: usize,
    ) -> Self {
        let mut positions = Vec::with_capacity(max_segments + 1);
        for i in 0..=max_segments {
            positions.push(root + free_stream_direction * (segment_length * i as Float));
        }

        let finest = StrandLevel {
            velocities: vec![SpatialVector::default(); positions.len()],
            segment_circulation: vec![0.0; max_segments],
            positions,
        };

        Self { levels: vec![finest], live_segment_count: max_segments, max_segments }
    }

    /// Re-anchors segment 0's position to the strand's owning trailing-edge node, per time step
    /// before advection (§4.I step 0).
    pub fn reanchor_root(&mut self, trailing_edge_node: SpatialVector) {
        if let Some(level) = self.levels.first_mut() {
            if let Some(first) = level.positions.first_mut() {
                *first = trailing_edge_node;
            }
        }
    }

    /// Grows the live prefix by one segment (unsteady mode); the newly live segment's node is
    /// seeded from the strand's free-stream-pinned tail position it replaces.
    pub fn grow_live_prefix(&mut self) {
        if self.live_segment_count < self.max_segments {
            self.live_segment_count += 1;
        }
    }

    /// Builds the multi-level agglomeration on top of the finest level by pairing adjacent
    /// segments (`K -> K/2 -> K/4 -> ...`), stopping once a level has a single segment. Positions
    /// at a coarser level are the endpoints shared with the finest level's segments at even
    /// boundaries; the agglomerated segment's circulation is the sum of its two children (a
    /// straight vortex sheet's net circulation is additive along its length).
    pub fn build_agglomeration(&mut self) {
        self.levels.truncate(1);

        loop {
            let finer = self.levels.last().unwrap();
            let fine_segments = finer.segment_circulation.len();
            if fine_segments < 2 {
                break;
            }

            let coarse_segments = fine_segments / 2;
            let mut positions = Vec::with_capacity(coarse_segments + 1);
            let mut segment_circulation = Vec::with_capacity(coarse_segments);

            for i in 0..=coarse_segments {
                positions.push(finer.positions[(2 * i).min(finer.positions.len() - 1)]);
            }
            for i in 0..coarse_segments {
                segment_circulation.push(finer.segment_circulation[2 * i] + finer.segment_circulation[2 * i + 1]);
            }

            let velocities = vec![SpatialVector::default(); positions.len()];
            self.levels.push(StrandLevel { positions, velocities, segment_circulation });

            if fine_segments % 2 != 0 {
                break;
            }
        }
    }

    /// Writes every finest-level segment's circulation from a chosen `Gamma` snapshot (§4.C),
    /// then rebuilds the agglomeration so the coarser levels stay consistent.
    pub fn apply_roll_up(
        &mut self,
        latest_gamma: Float,
        shifted_gamma: Float,
        mode: WakeRollUpMode,
    ) -> Result<(), Error> {
        let finest = self.levels.first_mut().ok_or_else(|| {
            Error::WakeOutOfDomain("strand has no segment levels to roll up".to_string())
        })?;

        let value = match mode {
            WakeRollUpMode::Implicit => latest_gamma,
            WakeRollUpMode::Explicit => shifted_gamma,
            WakeRollUpMode::All => latest_gamma + shifted_gamma,
        };

        for gamma in finest.segment_circulation.iter_mut() {
            *gamma = value;
        }

        self.build_agglomeration();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strand_has_expected_segment_count() {
        let strand = Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 8);
        assert_eq!(strand.levels[0].segment_circulation.len(), 8);
        assert_eq!(strand.levels[0].positions.len(), 9);
        assert_eq!(strand.live_segment_count, 8);
    }

    #[test]
    fn test_grow_live_prefix_caps_at_max() {
        let mut strand = Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 2);
        strand.live_segment_count = 0;

        strand.grow_live_prefix();
        strand.grow_live_prefix();
        strand.grow_live_prefix();

        assert_eq!(strand.live_segment_count, 2);
    }

    #[test]
    fn test_agglomeration_halves_segment_count_per_level() {
        let mut strand = Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 8);
        strand.build_agglomeration();

        let counts: Vec<usize> = strand.levels.iter().map(|l| l.segment_circulation.len()).collect();
        assert_eq!(counts, vec![8, 4, 2, 1]);
    }

    #[test]
    fn test_apply_roll_up_implicit_uses_latest_gamma() {
        let mut strand = Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 4);
        strand.apply_roll_up(3.0, 1.0, WakeRollUpMode::Implicit).unwrap();

        assert!(strand.levels[0].segment_circulation.iter().all(|&g| (g - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_apply_roll_up_all_sums_both_snapshots() {
        let mut strand = Strand::new_pinned_to_free_stream(SpatialVector::default(), SpatialVector::unit_x(), 0.1, 4);
        strand.apply_roll_up(3.0, 1.0, WakeRollUpMode::All).unwrap();

        assert!(strand.levels[0].segment_circulation.iter().all(|&g| (g - 4.0).abs() < 1e-12));
    }
}
