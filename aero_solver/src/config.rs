// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Solver-wide configuration, built entirely from a serialized settings tree. The core never
//! reads process environment variables; a CLI collaborator is responsible for producing a
//! [`SolverConfig`].

use serde::{Deserialize, Serialize};

use crate::error::Error;
use aero_math::type_aliases::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Whether surface unknowns are solved with the symmetrized VLM normal-velocity operator or the
/// panel-mode `A^T A` product.
pub enum AnalysisType {
    Vlm,
    Panel,
}

impl AnalysisType {
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "vlm" => Ok(Self::Vlm),
            "panel" => Ok(Self::Panel),
            _ => Err(Error::UnknownAnalysisType(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Which preconditioner the solver applies at each GMRES iteration.
pub enum PreconditionerKind {
    Block,
    Jacobi,
    Ssor,
}

impl PreconditionerKind {
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "jacobi" => Ok(Self::Jacobi),
            "ssor" => Ok(Self::Ssor),
            _ => Err(Error::UnknownPreconditioner(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Which upstream circulation snapshot a wake strand's segments pick up their strength from after
/// a solve.
pub enum WakeRollUpMode {
    Implicit,
    Explicit,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Settings for the hierarchical interaction-list builder (§4.D).
pub struct InteractionSettings {
    #[serde(default = "InteractionSettings::default_far_factor_subsonic")]
    pub far_factor_subsonic: Float,
    #[serde(default)]
    pub is_supersonic: bool,
    #[serde(default = "InteractionSettings::default_near_field_veto_distance_ratio")]
    pub near_field_veto_distance_ratio: Float,
    #[serde(default = "InteractionSettings::default_opposite_facing_veto_ratio")]
    pub opposite_facing_veto_ratio: Float,
}

impl InteractionSettings {
    pub fn default_far_factor_subsonic() -> Float {
        5.0
    }
    pub fn default_near_field_veto_distance_ratio() -> Float {
        2.0
    }
    pub fn default_opposite_facing_veto_ratio() -> Float {
        0.25
    }

    /// The effective far-field factor: infinite for supersonic flow, which forces every
    /// interaction list down to the finest level.
    pub fn far_factor(&self) -> Float {
        if self.is_supersonic {
            aero_math::consts::INFINITY
        } else {
            self.far_factor_subsonic
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            far_factor_subsonic: Self::default_far_factor_subsonic(),
            is_supersonic: false,
            near_field_veto_distance_ratio: Self::default_near_field_veto_distance_ratio(),
            opposite_facing_veto_ratio: Self::default_opposite_facing_veto_ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Settings for the block/Jacobi/SSOR preconditioner (§4.F).
pub struct PreconditionerSettings {
    #[serde(default = "PreconditionerSettings::default_kind")]
    pub kind: PreconditionerKind,
    #[serde(default = "PreconditionerSettings::default_target_block_size")]
    pub target_block_size: usize,
    #[serde(default = "PreconditionerSettings::default_block_size_tolerance")]
    pub block_size_tolerance: Float,
    #[serde(default = "PreconditionerSettings::default_jacobi_relaxation")]
    pub jacobi_relaxation: Float,
}

impl PreconditionerSettings {
    pub fn default_kind() -> PreconditionerKind {
        PreconditionerKind::Block
    }
    pub fn default_target_block_size() -> usize {
        500
    }
    pub fn default_block_size_tolerance() -> Float {
        1.25
    }
    pub fn default_jacobi_relaxation() -> Float {
        0.25
    }
}

impl Default for PreconditionerSettings {
    fn default() -> Self {
        Self {
            kind: Self::default_kind(),
            target_block_size: Self::default_target_block_size(),
            block_size_tolerance: Self::default_block_size_tolerance(),
            jacobi_relaxation: Self::default_jacobi_relaxation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Settings for right-preconditioned GMRES(restart) (§4.G).
pub struct GmresSettings {
    #[serde(default = "GmresSettings::default_restart_length")]
    pub restart_length: usize,
    #[serde(default = "GmresSettings::default_max_outer_cycles")]
    pub max_outer_cycles: usize,
    #[serde(default = "GmresSettings::default_absolute_tolerance")]
    pub absolute_tolerance: Float,
    #[serde(default = "GmresSettings::default_relative_tolerance")]
    pub relative_tolerance: Float,
}

impl GmresSettings {
    pub fn default_restart_length() -> usize {
        500
    }
    pub fn default_max_outer_cycles() -> usize {
        3
    }
    pub fn default_absolute_tolerance() -> Float {
        1e-10
    }
    pub fn default_relative_tolerance() -> Float {
        1e-3
    }
}

impl Default for GmresSettings {
    fn default() -> Self {
        Self {
            restart_length: Self::default_restart_length(),
            max_outer_cycles: Self::default_max_outer_cycles(),
            absolute_tolerance: Self::default_absolute_tolerance(),
            relative_tolerance: Self::default_relative_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Settings for the trailing-wake state machine (§4.C, §4.I).
pub struct WakeSettings {
    #[serde(default = "WakeSettings::default_segment_depth_power")]
    pub segment_depth_power: u32,
    #[serde(default = "WakeSettings::default_viscous_core_length")]
    pub viscous_core_length: Float,
    #[serde(default = "WakeSettings::default_roll_up_mode")]
    pub roll_up_mode: WakeRollUpMode,
    #[serde(default = "WakeSettings::default_near_wall_damping_length_ratio")]
    pub near_wall_damping_length_ratio: Float,
}

impl WakeSettings {
    pub fn default_segment_depth_power() -> u32 {
        6
    }
    pub fn default_viscous_core_length() -> Float {
        1e-3
    }
    pub fn default_roll_up_mode() -> WakeRollUpMode {
        WakeRollUpMode::Implicit
    }
    pub fn default_near_wall_damping_length_ratio() -> Float {
        1.0
    }

    /// Number of live segments a strand has at full depth (`2^segment_depth_power`).
    pub fn max_segments(&self) -> usize {
        1usize << self.segment_depth_power
    }
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            segment_depth_power: Self::default_segment_depth_power(),
            viscous_core_length: Self::default_viscous_core_length(),
            roll_up_mode: Self::default_roll_up_mode(),
            near_wall_damping_length_ratio: Self::default_near_wall_damping_length_ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Top-level, environment-free solver configuration.
pub struct SolverConfig {
    #[serde(default = "SolverConfig::default_analysis_type")]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub symmetry_plane: bool,
    #[serde(default)]
    pub mach: Float,
    #[serde(default = "SolverConfig::default_time_step")]
    pub time_step: Float,
    #[serde(default = "SolverConfig::default_number_of_time_steps")]
    pub number_of_time_steps: usize,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub preconditioner: PreconditionerSettings,
    #[serde(default)]
    pub gmres: GmresSettings,
    #[serde(default)]
    pub wake: WakeSettings,
}

impl SolverConfig {
    pub fn default_analysis_type() -> AnalysisType {
        AnalysisType::Vlm
    }
    pub fn default_time_step() -> Float {
        0.01
    }
    pub fn default_number_of_time_steps() -> usize {
        1
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            analysis_type: Self::default_analysis_type(),
            symmetry_plane: false,
            mach: 0.0,
            time_step: Self::default_time_step(),
            number_of_time_steps: Self::default_number_of_time_steps(),
            interaction: Default::default(),
            preconditioner: Default::default(),
            gmres: Default::default(),
            wake: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_json() {
        let config = SolverConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SolverConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.analysis_type, config.analysis_type);
        assert_eq!(parsed.preconditioner.target_block_size, config.preconditioner.target_block_size);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"analysis_type": "Vlm", "bogus_field": 1}"#;
        let parsed: Result<SolverConfig, _> = serde_json::from_str(json);

        assert!(parsed.is_err());
    }

    #[test]
    fn test_analysis_type_parse_rejects_unknown_name() {
        assert!(matches!(AnalysisType::parse("vortons"), Err(Error::UnknownAnalysisType(_))));
    }
}
