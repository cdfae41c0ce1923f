// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Nonlinear curve fitting and parameter search utilities.

pub mod bounded_variable;
pub mod curve_fit;
pub mod particle_swarm;

pub mod prelude {
    pub use super::bounded_variable::BoundedVariable;
    pub use super::curve_fit::CurveFit;
    pub use super::particle_swarm::{ParticleSwarm, SwarmResult, SwarmState};
}
