// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! A wake sheet (§4.C, §4.I): the ordered collection of strands trailing off one connected run of
//! trailing-edge nodes, plus the CommonTE averaging rule that keeps adjacent strands from drifting
//! apart into a non-physical gap.

use rayon::prelude::*;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::error::Error;
use crate::interaction::build_wake_interaction_list_for_target;
use crate::vortex::segment::induced_velocity_of_segment;

use super::strand::Strand;

pub struct WakeSheet {
    pub strands: Vec<Strand>,
    /// `common_te_pairs[i] = (a, b)`: strand indices sharing a trailing-edge node that should be
    /// averaged together each step (§4.I step 6).
    pub common_te_pairs: Vec<(usize, usize)>,
}

impl WakeSheet {
    /// Induced velocity this sheet produces at each of `points`, via the wake interaction list
    /// builder (§4.D, §4.I step 4): distant strand segments are lumped to a coarser agglomeration
    /// level instead of every point summing every live finest-level segment directly.
    pub fn induced_velocity_at(
        &self,
        points: &[SpatialVector],
        viscous_core_length: Float,
        far_factor: Float,
    ) -> Vec<SpatialVector> {
        points
            .par_iter()
            .map(|&point| {
                let list = build_wake_interaction_list_for_target(self, point, far_factor);
                let mut total = SpatialVector::default();

                for source in list {
                    let data = &self.strands[source.strand_index].levels[source.level];
                    let gamma = data.segment_circulation[source.segment_index];
                    if gamma == 0.0 {
                        continue;
                    }

                    if let Ok(unit_velocity) = induced_velocity_of_segment(
                        data.positions[source.segment_index],
                        data.positions[source.segment_index + 1],
                        point,
                        viscous_core_length,
                    ) {
                        total += unit_velocity * gamma;
                    }
                }

                total
            })
            .collect()
    }

    /// Averages the node velocity at each declared CommonTE pair (§4.I step 6): after computing
    /// every strand's full per-node velocity field, the two strands sharing a trailing-edge root
    /// should advect together rather than drift into a seam.
    pub fn average_common_te_velocities(&mut self) -> Result<(), Error> {
        for &(a, b) in &self.common_te_pairs {
            if a == b || a >= self.strands.len() || b >= self.strands.len() {
                return Err(Error::WakeOutOfDomain(format!(
                    "CommonTE pair ({}, {}) is out of range for {} strands",
                    a, b, self.strands.len()
                )));
            }

            let len = self
                .strands[a]
                .levels[0]
                .velocities
                .len()
                .min(self.strands[b].levels[0].velocities.len());

            for i in 0..len {
                let va = self.strands[a].levels[0].velocities[i];
                let vb = self.strands[b].levels[0].velocities[i];
                let averaged = (va + vb) * 0.5;

                self.strands[a].levels[0].velocities[i] = averaged;
                self.strands[b].levels[0].velocities[i] = averaged;
            }
        }

        Ok(())
    }

    /// Advances every strand's live node positions by `velocity * dt` (§4.I step 7), forcing the
    /// last live node's velocity to the free-stream value first (step 5).
    pub fn advance(&mut self, free_stream_velocity: SpatialVector, dt: Float) {
        for strand in &mut self.strands {
            let finest = &mut strand.levels[0];
            let last_live_node = strand.live_segment_count.min(finest.positions.len().saturating_sub(1));

            if let Some(v) = finest.velocities.get_mut(last_live_node) {
                *v = free_stream_velocity;
            }

            for i in 0..=last_live_node {
                finest.positions[i] += finest.velocities[i] * dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wake::strand::Strand;

    fn sheet_with_two_parallel_strands() -> WakeSheet {
        let a = Strand::new_pinned_to_free_stream(SpatialVector::new(0.0, 0.0, 0.0), SpatialVector::unit_x(), 0.1, 4);
        let b = Strand::new_pinned_to_free_stream(SpatialVector::new(0.0, 1.0, 0.0), SpatialVector::unit_x(), 0.1, 4);
        WakeSheet { strands: vec![a, b], common_te_pairs: vec![(0, 1)] }
    }

    #[test]
    fn test_average_common_te_velocities_equalizes_pair() {
        let mut sheet = sheet_with_two_parallel_strands();
        sheet.strands[0].levels[0].velocities[0] = SpatialVector::new(1.0, 0.0, 0.0);
        sheet.strands[1].levels[0].velocities[0] = SpatialVector::new(3.0, 0.0, 0.0);

        sheet.average_common_te_velocities().unwrap();

        assert_eq!(sheet.strands[0].levels[0].velocities[0], SpatialVector::new(2.0, 0.0, 0.0));
        assert_eq!(sheet.strands[1].levels[0].velocities[0], SpatialVector::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_average_common_te_rejects_out_of_range_pair() {
        let mut sheet = sheet_with_two_parallel_strands();
        sheet.common_te_pairs = vec![(0, 5)];
        assert!(matches!(sheet.average_common_te_velocities(), Err(Error::WakeOutOfDomain(_))));
    }

    #[test]
    fn test_advance_moves_live_nodes_by_velocity_times_dt() {
        let mut sheet = sheet_with_two_parallel_strands();
        for v in sheet.strands[0].levels[0].velocities.iter_mut() {
            *v = SpatialVector::new(0.0, 0.0, 1.0);
        }

        sheet.advance(SpatialVector::new(1.0, 0.0, 0.0), 0.5);

        assert!((sheet.strands[0].levels[0].positions[0].z() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_induced_velocity_is_zero_with_no_circulation() {
        let sheet = sheet_with_two_parallel_strands();
        let result = sheet.induced_velocity_at(&[SpatialVector::new(0.5, 0.5, 1.0)], 1e-3, 5.0);
        assert_eq!(result[0], SpatialVector::default());
    }
}
