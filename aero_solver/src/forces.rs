// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The force integrator (§4.J): bound Kutta-Jukowski forces, Trefftz-plane induced drag, the
//! unsteady pressure term, and pressure-coefficient corrections, rolled up at panel, span-station,
//! surface, and group level.

use rayon::prelude::*;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::error::Error;
use crate::geometry::{GridLevel, Index};

#[derive(Debug, Clone, Copy, Default)]
pub struct PanelForce {
    pub force: SpatialVector,
    pub pressure_coefficient: Float,
}

/// Bound Kutta-Jukowski force per edge, `F = rho * Gamma_edge * (V x L)`, split between the edge's
/// two adjacent loops by inverse-squared-distance weighting from each loop's centroid to the
/// edge midpoint.
pub fn bound_kutta_jukowski_forces(
    surface: &GridLevel,
    edge_circulation: &[Float],
    loop_velocity: &[SpatialVector],
    density: Float,
) -> Vec<SpatialVector> {
    let mut forces = vec![SpatialVector::default(); surface.loops.len()];

    for (edge_index, edge) in surface.edges.iter().enumerate() {
        let gamma = edge_circulation[edge_index];
        if gamma == 0.0 {
            continue;
        }

        let p1 = surface.node(edge.nodes[0]).position;
        let p2 = surface.node(edge.nodes[1]).position;
        let midpoint = (p1 + p2) * 0.5;
        let edge_vector = p2 - p1;

        let mut weights = Vec::with_capacity(2);
        for loop_id in [edge.left_loop, edge.right_loop] {
            if loop_id == 0 {
                continue;
            }
            let distance_sq = (midpoint - surface.get_loop(loop_id).centroid).length_squared().max(1e-12);
            weights.push((loop_id, 1.0 / distance_sq));
        }

        let weight_sum: Float = weights.iter().map(|(_, w)| w).sum();
        if weight_sum <= 0.0 {
            continue;
        }

        for (loop_id, weight) in weights {
            let velocity = loop_velocity[loop_id - 1];
            let force = (velocity.cross(edge_vector)) * (density * gamma * weight / weight_sum);
            forces[loop_id - 1] += force;
        }
    }

    forces
}

/// Trefftz-plane induced drag from each trailing edge: induces the wake-sheet-on-wake-sheet
/// velocity back onto its own trailing edge and forms `F = rho * Gamma * (V_wake x L)`.
pub fn trefftz_plane_force(
    trailing_edge_id: Index,
    surface: &GridLevel,
    wake_self_induced_velocity: SpatialVector,
    density: Float,
) -> SpatialVector {
    let edge = surface.edge(trailing_edge_id);
    let gamma = edge.circulation;
    let edge_vector = surface.node(edge.nodes[1]).position - surface.node(edge.nodes[0]).position;

    wake_self_induced_velocity.cross(edge_vector) * (density * gamma)
}

/// Unsteady pressure contribution, distributed as an area-weighted normal force to each edge of
/// the loop: `dCp_unsteady = -(dGamma/dt) / V_ref^2`.
pub fn unsteady_pressure_force(loop_area: Float, loop_normal: SpatialVector, dgamma_dt: Float, v_ref: Float) -> SpatialVector {
    if v_ref <= 0.0 {
        return SpatialVector::default();
    }

    let dcp = -dgamma_dt / (v_ref * v_ref);
    loop_normal * (dcp * loop_area)
}

/// Pressure coefficient `Cp = 1 - (|V| / V_ref)^2`, clipped to `[cp_min, cp_max]`, then corrected
/// with the Karman-Tsien rule iterated until the correction factor changes by less than `1e-2`.
pub fn pressure_coefficient_karman_tsien(
    local_speed: Float,
    v_ref: Float,
    mach: Float,
    cp_min: Float,
    cp_max: Float,
) -> Float {
    let cp_incompressible = (1.0 - (local_speed / v_ref).powi(2)).clamp(cp_min, cp_max);

    if mach <= 0.0 {
        return cp_incompressible;
    }

    let beta = (1.0 - mach * mach).max(1e-6).sqrt();
    let mut cp = cp_incompressible;
    let mut converged = false;

    for _ in 0..32 {
        let denominator = beta + (mach * mach / (1.0 + beta)) * (cp_incompressible / 2.0);
        let next_cp = cp_incompressible / denominator;
        if (next_cp - cp).abs() <= 1e-2 {
            cp = next_cp;
            converged = true;
            break;
        }
        cp = next_cp;
    }

    if !converged {
        log::warn!("Karman-Tsien correction did not converge in 32 iterations, using last iterate");
    }

    cp.clamp(cp_min, cp_max)
}

/// Clamps the local Mach number used by the Prandtl-Glauert correction to `<= 0.999`.
pub fn local_mach_prandtl_glauert(mach: Float, local_speed: Float, v_ref: Float) -> Float {
    if v_ref <= 0.0 {
        return 0.0;
    }
    (mach * local_speed / v_ref).min(0.999)
}

/// Sums panel forces over the given loop ids (used for span-station/surface/group roll-ups,
/// §4.J's consistency requirement across levels).
pub fn sum_forces(forces: &[SpatialVector], loop_ids: impl Iterator<Item = Index>) -> SpatialVector {
    loop_ids.fold(SpatialVector::default(), |acc, id| acc + forces[id - 1])
}

/// Sums every loop's force in parallel, for the aircraft-level total.
pub fn total_force(forces: &[SpatialVector]) -> SpatialVector {
    forces.par_iter().cloned().reduce(SpatialVector::default, |a, b| a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsteady_pressure_force_is_zero_with_no_reference_speed() {
        let f = unsteady_pressure_force(1.0, SpatialVector::unit_z(), 1.0, 0.0);
        assert_eq!(f, SpatialVector::default());
    }

    #[test]
    fn test_pressure_coefficient_clips_to_bounds() {
        let cp = pressure_coefficient_karman_tsien(100.0, 1.0, 0.0, -2.0, 1.0);
        assert_eq!(cp, -2.0);
    }

    #[test]
    fn test_local_mach_clamped_below_one() {
        let m = local_mach_prandtl_glauert(0.9, 10.0, 1.0);
        assert!(m <= 0.999);
    }

    #[test]
    fn test_sum_forces_matches_manual_sum() {
        let forces = vec![SpatialVector::new(1.0, 0.0, 0.0), SpatialVector::new(0.0, 2.0, 0.0)];
        let total = sum_forces(&forces, vec![1, 2].into_iter());
        assert_eq!(total, SpatialVector::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_total_force_matches_manual_sum() {
        let forces = vec![SpatialVector::new(1.0, 0.0, 0.0), SpatialVector::new(0.0, 2.0, 0.0)];
        assert_eq!(total_force(&forces), SpatialVector::new(1.0, 2.0, 0.0));
    }
}
