// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The geometry-ingestion seam (§1, §6). Mesh generation, CAD import, and coarsening are external
//! collaborators; the core only needs a stable [`GridHierarchy`] out of them.

use crate::error::Error;
use crate::geometry::GridHierarchy;

/// Supplies the solver with a grid hierarchy at setup. Implementations are expected to be stable
/// for the solver's lifetime: the solver never mutates the hierarchy and never asks for it twice
/// within one run.
pub trait GeometryProvider {
    /// Builds the full multi-level grid hierarchy. Implementations should validate their own
    /// connectivity and return [`Error::BadGeometry`]/[`Error::BadHierarchy`] rather than letting
    /// a malformed hierarchy reach the solver.
    fn build_hierarchy(&self) -> Result<GridHierarchy, Error>;
}
