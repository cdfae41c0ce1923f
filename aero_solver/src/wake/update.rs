// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The wake updater (§4.I): one call advances every strand's node velocities and positions by one
//! step (steady pseudo-step or unsteady `dt`), in the order listed below.

use rayon::prelude::*;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::config::WakeSettings;
use crate::error::Error;
use crate::geometry::GridLevel;
use crate::vortex::segment::induced_velocity_of_segment;

use super::sheet::WakeSheet;

/// Free-stream plus rigid-body and rotor-disk velocity contributions at a wake node, supplied by
/// the caller since those live in [`crate::geometry::component_group`] and the external rotor-disk
/// seam (§4.K, §6) rather than in the wake module itself.
pub struct AmbientVelocity {
    pub free_stream: SpatialVector,
    pub rigid_body_and_rotor: Box<dyn Fn(SpatialVector) -> SpatialVector + Sync>,
}

/// Exponential near-wall damping (§4.I step 3): suppresses the into-surface normal component of
/// the induced velocity within one panel length of a surface panel, falling off as
/// `exp(-distance / (damping_length_ratio * panel_length))`.
fn apply_near_wall_damping(
    point: SpatialVector,
    velocity: SpatialVector,
    surface: &GridLevel,
    damping_length_ratio: Float,
) -> SpatialVector {
    let mut damped = velocity;

    for panel in &surface.loops {
        let length = panel.characteristic_length();
        if length <= 0.0 {
            continue;
        }

        let offset = point - panel.centroid;
        let distance = offset.length();
        if distance > length {
            continue;
        }

        let into_surface = velocity.dot(panel.normal);
        if into_surface >= 0.0 {
            continue;
        }

        let falloff = (-distance / (damping_length_ratio * length)).exp();
        damped -= panel.normal * (into_surface * falloff);
    }

    damped
}

/// Runs one full wake-update pass over every sheet (§4.I steps 1-7).
pub fn update_wake_step(
    sheets: &mut [WakeSheet],
    surface: &GridLevel,
    ambient: &AmbientVelocity,
    settings: &WakeSettings,
    far_factor: Float,
    dt: Float,
) -> Result<(), Error> {
    let viscous_core_length = settings.viscous_core_length;

    // Computed against the pre-step configuration of every sheet, so a strand does not see its own
    // partially-advanced neighbors mid-pass (step 4, wake-sheet-on-wake-sheet induction).
    let mut per_sheet_velocities: Vec<Vec<Vec<SpatialVector>>> = Vec::with_capacity(sheets.len());

    for (sheet_index, sheet) in sheets.iter().enumerate() {
        let mut per_strand_velocities = Vec::with_capacity(sheet.strands.len());

        for strand in &sheet.strands {
            let finest = &strand.levels[0];
            let n = finest.positions.len();

            let velocities: Vec<SpatialVector> = (0..n)
                .into_par_iter()
                .map(|i| {
                    let point = finest.positions[i];
                    let mut v = ambient.free_stream + (ambient.rigid_body_and_rotor)(point);

                    for (other_index, other_sheet) in sheets.iter().enumerate() {
                        if other_index == sheet_index {
                            continue;
                        }
                        let induced = other_sheet.induced_velocity_at(&[point], viscous_core_length, far_factor);
                        v += induced[0];
                    }

                    apply_near_wall_damping(point, v, surface, settings.near_wall_damping_length_ratio)
                })
                .collect();

            per_strand_velocities.push(velocities);
        }

        per_sheet_velocities.push(per_strand_velocities);
    }

    for (sheet, strand_velocities) in sheets.iter_mut().zip(per_sheet_velocities.into_iter()) {
        for (strand, velocities) in sheet.strands.iter_mut().zip(strand_velocities.into_iter()) {
            strand.levels[0].velocities = velocities;
        }

        sheet.average_common_te_velocities()?;
        sheet.advance(ambient.free_stream, dt);
    }

    Ok(())
}

/// Convergence metric for the steady wake-relaxation loop (§4.I): `log10` of the maximum node
/// displacement over the step just taken.
pub fn max_displacement_log10(before: &[SpatialVector], after: &[SpatialVector]) -> Float {
    let max_displacement = before
        .iter()
        .zip(after.iter())
        .map(|(b, a)| (*a - *b).length())
        .fold(0.0, Float::max);

    if max_displacement <= 0.0 {
        Float::NEG_INFINITY
    } else {
        max_displacement.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::provider::test_support::FlatRectangularWing;
    use crate::geometry::provider::GeometryProvider;
    use crate::wake::strand::Strand;

    fn ambient_free_stream_only() -> AmbientVelocity {
        AmbientVelocity {
            free_stream: SpatialVector::new(1.0, 0.0, 0.0),
            rigid_body_and_rotor: Box::new(|_| SpatialVector::default()),
        }
    }

    #[test]
    fn test_update_wake_step_advects_nodes_downstream() {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let hierarchy = wing.build_hierarchy().unwrap();

        let strand = Strand::new_pinned_to_free_stream(SpatialVector::new(1.0, 0.0, 0.0), SpatialVector::unit_x(), 0.1, 4);
        let mut sheets = vec![WakeSheet { strands: vec![strand], common_te_pairs: vec![] }];

        let before: Vec<SpatialVector> = sheets[0].strands[0].levels[0].positions.clone();

        let settings = WakeSettings::default();
        update_wake_step(&mut sheets, hierarchy.finest(), &ambient_free_stream_only(), &settings, 5.0, 0.1).unwrap();

        let after = &sheets[0].strands[0].levels[0].positions;
        assert!(after[0].x() > before[0].x());
    }

    #[test]
    fn test_max_displacement_log10_is_negative_infinity_when_unchanged() {
        let points = vec![SpatialVector::default(); 3];
        assert_eq!(max_displacement_log10(&points, &points), Float::NEG_INFINITY);
    }
}
