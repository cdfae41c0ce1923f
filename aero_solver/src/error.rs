// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! An implementation of a common error type that is used throughout the library.

use serde_json;
use std::fmt;

#[derive(Debug)]
/// A common error type intended to represent the various errors that can occur while using this
/// library.
pub enum Error {
    /// A loop with zero area, duplicate edge nodes, or a zero-diagonal influence entry. Carries
    /// the offending loop id.
    BadGeometry { loop_id: usize, message: String },
    /// A cycle in the grid hierarchy's parent/child links, a mismatched child cover, or a
    /// hierarchy with only one level.
    BadHierarchy(String),
    /// GMRES exhausted all outer cycles without meeting the stopping tolerance.
    LinearSolverDiverged { final_relative_residual: f64 },
    /// A wake node's time exceeds the history buffer during interpolation.
    WakeOutOfDomain(String),
    /// An unrecognized preconditioner name in the configuration.
    UnknownPreconditioner(String),
    /// An unrecognized analysis type (VLM/panel) in the configuration.
    UnknownAnalysisType(String),
    /// Interface to the standard library IO error.
    Io(std::io::Error),
    /// Interface to the Serde JSON error.
    SerdeJson(serde_json::Error),
    /// A custom error that can be created from a string.
    CustomStringError(String),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerdeJson(error)
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::CustomStringError(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BadGeometry { loop_id, message } => {
                write!(f, "bad geometry at loop {}: {}", loop_id, message)
            }
            Error::BadHierarchy(message) => write!(f, "bad grid hierarchy: {}", message),
            Error::LinearSolverDiverged { final_relative_residual } => write!(
                f,
                "linear solver diverged: final relative residual {:.3e}",
                final_relative_residual
            ),
            Error::WakeOutOfDomain(message) => write!(f, "wake out of domain: {}", message),
            Error::UnknownPreconditioner(name) => write!(f, "unknown preconditioner: {}", name),
            Error::UnknownAnalysisType(name) => write!(f, "unknown analysis type: {}", name),
            Error::Io(error) => write!(f, "IO error: {}", error),
            Error::SerdeJson(error) => write!(f, "Serde JSON error: {}", error),
            Error::CustomStringError(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {}
