// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! `SolverSession` (§4.L): owns everything a time step needs and exposes the step's constituent
//! operations as methods, so the time driver (§4.K) is a thin loop and a test can drive any one
//! operation directly against a synthetic geometry.

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::config::{AnalysisType, PreconditionerKind, SolverConfig};
use crate::constraints::{build_rhs, AmbientFlow};
use crate::error::Error;
use crate::external::RotorDisk;
use crate::forces::{
    bound_kutta_jukowski_forces, local_mach_prandtl_glauert, pressure_coefficient_karman_tsien, PanelForce,
};
use crate::geometry::kelvin::{build_kelvin_groups, KelvinGroups};
use crate::geometry::provider::GeometryProvider;
use crate::geometry::GridHierarchy;
use crate::gmres::{solve, solve_normal_equations, GmresResult};
use crate::interaction::{build_fixed_loop_lists, SourceRef};
use crate::operator::MatrixOperator;
use crate::precondition::block::BlockPreconditioner;
use crate::precondition::jacobi::JacobiPreconditioner;
use crate::precondition::ssor::SsorPreconditioner;
use crate::precondition::Preconditioner;
use crate::wake::update::AmbientVelocity;
use crate::wake::{update_wake_step, WakeSheet};

/// The last three converged `Gamma` snapshots, shifted one step at a time (§4.K, §6 restart
/// file). `n` is always the most recently solved snapshot.
#[derive(Debug, Clone, Default)]
pub struct GammaHistory {
    pub n_minus_2: Vec<Float>,
    pub n_minus_1: Vec<Float>,
    pub n: Vec<Float>,
}

impl GammaHistory {
    fn shift_in(&mut self, latest: Vec<Float>) {
        self.n_minus_2 = std::mem::take(&mut self.n_minus_1);
        self.n_minus_1 = std::mem::take(&mut self.n);
        self.n = latest;
    }
}

/// Bundles one step's solve result and integrated forces for the caller (the time driver, or a
/// test exercising `step` directly).
pub struct StepOutput {
    pub gmres: GmresResult,
    pub panel_forces: Vec<PanelForce>,
}

fn build_preconditioner(
    hierarchy: &GridHierarchy,
    kelvin: &KelvinGroups,
    config: &SolverConfig,
) -> Result<Box<dyn Preconditioner + Send + Sync>, Error> {
    let viscous_core_length = config.wake.viscous_core_length;

    Ok(match config.preconditioner.kind {
        PreconditionerKind::Block => {
            Box::new(BlockPreconditioner::build(hierarchy, kelvin, &config.preconditioner, viscous_core_length)?)
        }
        PreconditionerKind::Jacobi => Box::new(JacobiPreconditioner::build(
            hierarchy.finest(),
            kelvin,
            &config.preconditioner,
            viscous_core_length,
        )),
        PreconditionerKind::Ssor => {
            Box::new(SsorPreconditioner::build(hierarchy.finest(), kelvin, &config.preconditioner, viscous_core_length))
        }
    })
}

pub struct SolverSession {
    pub hierarchy: GridHierarchy,
    pub kelvin: KelvinGroups,
    pub config: SolverConfig,
    pub fixed_interaction_lists: Vec<Vec<SourceRef>>,
    /// Rebuilt whenever relative motion between components invalidates the cached lists; `None`
    /// means "use the fixed lists" (the all-at-rest case, §4.D).
    pub moving_interaction_lists: Option<Vec<Vec<SourceRef>>>,
    pub preconditioner: Box<dyn Preconditioner + Send + Sync>,
    pub wake_sheets: Vec<WakeSheet>,
    pub gamma_history: GammaHistory,
}

impl SolverSession {
    /// Builds a session from a geometry provider and configuration: validates the hierarchy,
    /// builds the Kelvin groups against `free_stream`'s direction, the fixed interaction lists,
    /// and the configured preconditioner.
    pub fn new(
        geometry: &dyn GeometryProvider,
        config: SolverConfig,
        free_stream: SpatialVector,
    ) -> Result<Self, Error> {
        let hierarchy = geometry.build_hierarchy()?;
        hierarchy.validate()?;

        let kelvin = build_kelvin_groups(hierarchy.finest(), free_stream.normalize());
        let fixed_interaction_lists = build_fixed_loop_lists(&hierarchy, &config.interaction, config.analysis_type)?;
        let preconditioner = build_preconditioner(&hierarchy, &kelvin, &config)?;

        let number_of_loops = hierarchy.finest().loops.len();

        Ok(Self {
            hierarchy,
            kelvin,
            config,
            fixed_interaction_lists,
            moving_interaction_lists: None,
            preconditioner,
            wake_sheets: Vec::new(),
            gamma_history: GammaHistory {
                n_minus_2: vec![0.0; number_of_loops],
                n_minus_1: vec![0.0; number_of_loops],
                n: vec![0.0; number_of_loops],
            },
        })
    }

    fn active_interaction_lists(&self) -> &[Vec<SourceRef>] {
        self.moving_interaction_lists.as_deref().unwrap_or(&self.fixed_interaction_lists)
    }

    /// Rebuilds the moving-loop interaction lists from the current hierarchy (§4.D). A session
    /// with no moving components never needs to call this; the time driver decides when relative
    /// motion has invalidated the cached lists.
    pub fn refresh_interaction_lists(&mut self) -> Result<(), Error> {
        self.moving_interaction_lists =
            Some(build_fixed_loop_lists(&self.hierarchy, &self.config.interaction, self.config.analysis_type)?);
        Ok(())
    }

    fn operator(&self) -> MatrixOperator<'_> {
        MatrixOperator {
            hierarchy: &self.hierarchy,
            interaction_lists: self.active_interaction_lists(),
            kelvin: &self.kelvin,
            viscous_core_length: self.config.wake.viscous_core_length,
            analysis_type: self.config.analysis_type,
        }
    }

    /// Builds the augmented RHS (§4.H).
    pub fn build_rhs(
        &self,
        ambient: &AmbientFlow<'_>,
        hinge_angle_by_loop: impl Fn(usize) -> Option<(Float, SpatialVector)> + Sync,
    ) -> Result<Vec<Float>, Error> {
        build_rhs(self.hierarchy.finest(), &self.kelvin, ambient, hinge_angle_by_loop)
    }

    /// Solves `A x = b` (VLM mode) or the normal equations `A^T A x = A^T b` (panel mode) with
    /// the configured preconditioner (§4.E, §4.G).
    pub fn solve_linear_system(&self, rhs: &[Float], initial_guess: Vec<Float>) -> Result<GmresResult, Error> {
        let operator = self.operator();

        match self.config.analysis_type {
            AnalysisType::Vlm => solve(
                |x| operator.apply(x),
                self.preconditioner.as_ref(),
                rhs,
                initial_guess,
                &self.config.gmres,
            ),
            AnalysisType::Panel => {
                solve_normal_equations(&operator, self.preconditioner.as_ref(), rhs, initial_guess, &self.config.gmres)
            }
        }
    }

    /// Advances every wake sheet by one step (§4.I).
    pub fn update_wake(&mut self, ambient: AmbientVelocity, dt: Float) -> Result<(), Error> {
        update_wake_step(
            &mut self.wake_sheets,
            self.hierarchy.finest(),
            &ambient,
            &self.config.wake,
            self.config.interaction.far_factor(),
            dt,
        )
    }

    /// Integrates bound Kutta-Jukowski forces and the pressure coefficient (with Karman-Tsien
    /// compressibility correction) at every finest-level loop, from a solved augmented vector
    /// (§4.J). Trefftz-plane and unsteady contributions are left to the caller, which has the
    /// wake-sheet and `dGamma/dt` context this method does not.
    pub fn integrate_forces(
        &self,
        solution: &[Float],
        density: Float,
        v_ref: Float,
        mach: Float,
        pressure_coefficient_bounds: (Float, Float),
    ) -> Result<Vec<PanelForce>, Error> {
        let operator = self.operator();
        let edge_circulation = operator.finest_edge_circulations(solution)?;
        let loop_velocity = operator.induced_velocity_at_loops(solution)?;
        let bound_forces = bound_kutta_jukowski_forces(self.hierarchy.finest(), &edge_circulation, &loop_velocity, density);

        let (cp_min, cp_max) = pressure_coefficient_bounds;

        Ok(bound_forces
            .into_iter()
            .zip(loop_velocity.iter())
            .map(|(force, velocity)| {
                let local_speed = velocity.length();
                let local_mach = local_mach_prandtl_glauert(mach, local_speed, v_ref);
                let pressure_coefficient =
                    pressure_coefficient_karman_tsien(local_speed, v_ref, local_mach, cp_min, cp_max);

                PanelForce { force, pressure_coefficient }
            })
            .collect())
    }

    /// Runs one full step (§4.K, §2): build the RHS, solve, shift the Gamma history, advance the
    /// wake, integrate forces.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        ambient_flow: &AmbientFlow<'_>,
        hinge_angle_by_loop: impl Fn(usize) -> Option<(Float, SpatialVector)> + Sync,
        ambient_velocity: AmbientVelocity,
        dt: Float,
        density: Float,
        v_ref: Float,
        mach: Float,
        pressure_coefficient_bounds: (Float, Float),
    ) -> Result<StepOutput, Error> {
        let rhs = self.build_rhs(ambient_flow, hinge_angle_by_loop)?;
        let initial_guess = vec![0.0; rhs.len()];
        let gmres = self.solve_linear_system(&rhs, initial_guess)?;

        let number_of_loops = self.hierarchy.finest().loops.len();
        self.gamma_history.shift_in(gmres.solution[1..=number_of_loops].to_vec());

        self.update_wake(ambient_velocity, dt)?;

        let panel_forces =
            self.integrate_forces(&gmres.solution, density, v_ref, mach, pressure_coefficient_bounds)?;

        Ok(StepOutput { gmres, panel_forces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::provider::test_support::FlatRectangularWing;

    fn no_rotors() -> Vec<Box<dyn RotorDisk + Sync>> {
        vec![]
    }

    fn flat_wing_session(analysis_type: AnalysisType) -> SolverSession {
        let wing = FlatRectangularWing { span: 2.0, chord: 1.0, chordwise_panels: 2, spanwise_panels: 2 };
        let mut config = SolverConfig::default();
        config.analysis_type = analysis_type;

        SolverSession::new(&wing, config, SpatialVector::new(1.0, 0.0, 0.0)).unwrap()
    }

    #[test]
    fn test_new_session_builds_one_interaction_list_per_loop() {
        let session = flat_wing_session(AnalysisType::Vlm);
        assert_eq!(session.fixed_interaction_lists.len(), session.hierarchy.finest().loops.len());
    }

    #[test]
    fn test_step_produces_a_converged_solve_for_a_flat_wing() {
        let mut session = flat_wing_session(AnalysisType::Vlm);
        let rotors = no_rotors();

        let ambient_flow = AmbientFlow {
            free_stream: SpatialVector::new(0.0, 0.0, -1.0),
            rigid_body_velocity_at: Box::new(|_| SpatialVector::default()),
            mirror_velocity_at: Box::new(|_| SpatialVector::default()),
            body_motion_velocity_at: Box::new(|_| SpatialVector::default()),
            rotors: &rotors,
        };

        let ambient_velocity = AmbientVelocity {
            free_stream: SpatialVector::new(1.0, 0.0, 0.0),
            rigid_body_and_rotor: Box::new(|_| SpatialVector::default()),
        };

        let output = session
            .step(&ambient_flow, |_| None, ambient_velocity, 0.01, 1.2, 1.0, 0.0, (-5.0, 1.0))
            .unwrap();

        assert_eq!(output.panel_forces.len(), session.hierarchy.finest().loops.len());
        assert_eq!(session.gamma_history.n.len(), session.hierarchy.finest().loops.len());
    }

    #[test]
    fn test_refresh_interaction_lists_populates_moving_lists() {
        let mut session = flat_wing_session(AnalysisType::Vlm);
        assert!(session.moving_interaction_lists.is_none());

        session.refresh_interaction_lists().unwrap();

        assert!(session.moving_interaction_lists.is_some());
        assert_eq!(
            session.moving_interaction_lists.as_ref().unwrap().len(),
            session.hierarchy.finest().loops.len()
        );
    }
}
