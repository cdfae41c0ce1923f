// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The arena-based data model: nodes, edges, loops, and the multi-level grid hierarchy that the
//! interaction-list builder and the preconditioner both read. All of it is supplied once, at
//! setup, by an external [`GeometryProvider`] and is immutable thereafter; only per-loop/per-edge
//! circulation mutates during a solve.

pub mod component_group;
pub mod kelvin;
pub mod provider;

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::error::Error;

/// A dense, 1-based entity index into one of [`GridLevel`]'s arrays; `0` is the sentinel "no
/// entity" value, matching the arena convention used throughout the data model (§3).
pub type Index = usize;

/// The sentinel index meaning "no entity" (a boundary edge's missing loop, a level-1 edge's
/// absent coarse parent, ...).
pub const NONE: Index = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub position: SpatialVector,
    /// On the finest grid, the circulation jump of the trailing strand rooted here. Zero on
    /// non-trailing-edge nodes and on coarser levels.
    pub trailing_edge_circulation_jump: Float,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub nodes: [Index; 2],
    /// `0` if the edge lies on a boundary (no loop on that side).
    pub left_loop: Index,
    pub right_loop: Index,
    pub is_trailing_edge: bool,
    pub circulation: Float,
    /// The corresponding edge one level finer, `0` on the finest level.
    pub fine_child: Index,
    /// The corresponding edge one level coarser, `0` on the coarsest level.
    pub coarse_parent: Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceType {
    LiftingWing,
    ThickBody,
    Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    /// 3 or 4 edge indices, ordered around the loop.
    pub edges: Vec<Index>,
    pub centroid: SpatialVector,
    pub area: Float,
    pub normal: SpatialVector,
    pub circulation: Float,
    pub surface_type: SurfaceType,
    pub component_id: Index,
    pub span_station_index: usize,
    /// The loops this one subdivides into one level finer; empty on the finest level.
    pub fine_children: Vec<Index>,
    /// `0` on the coarsest level.
    pub coarse_parent: Index,
}

impl Loop {
    /// The characteristic length used by the far-field admissibility test (§4.D): the square
    /// root of the panel's area.
    pub fn characteristic_length(&self) -> Float {
        self.area.sqrt()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridLevel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub loops: Vec<Loop>,
}

impl GridLevel {
    pub fn node(&self, index: Index) -> &Node {
        &self.nodes[index - 1]
    }
    pub fn edge(&self, index: Index) -> &Edge {
        &self.edges[index - 1]
    }
    pub fn get_loop(&self, index: Index) -> &Loop {
        &self.loops[index - 1]
    }
}

#[derive(Debug, Clone, Default)]
/// Read-only view of `L` refinement levels. Level `1` (index `0` in [`Self::levels`]) is the
/// solve grid; the last level is the coarsest. There is no level-0 render mesh in this view; that
/// belongs to the geometry provider's own output formats, not to the solver core.
pub struct GridHierarchy {
    pub levels: Vec<GridLevel>,
}

impl GridHierarchy {
    pub fn number_of_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> &GridLevel {
        &self.levels[level - 1]
    }

    pub fn finest(&self) -> &GridLevel {
        self.level(1)
    }

    pub fn coarsest(&self) -> &GridLevel {
        self.level(self.number_of_levels())
    }

    /// Validates the invariants the interaction-list builder and preconditioner rely on: at
    /// least one level, and no cycle in the parent/child loop links.
    pub fn validate(&self) -> Result<(), Error> {
        if self.levels.is_empty() {
            return Err(Error::BadHierarchy("grid hierarchy has no levels".to_string()));
        }

        if self.number_of_levels() == 1 {
            // A single-level hierarchy is valid for the matrix operator, but the block
            // preconditioner has no coarser level to agglomerate blocks from.
            return Ok(());
        }

        for level in 1..self.number_of_levels() {
            for (fine_index, fine_loop) in self.level(level).loops.iter().enumerate() {
                let fine_id = fine_index + 1;

                if fine_loop.coarse_parent == NONE {
                    continue;
                }

                let parent = self.level(level + 1).get_loop(fine_loop.coarse_parent);

                if !parent.fine_children.contains(&fine_id) {
                    return Err(Error::BadHierarchy(format!(
                        "loop {} at level {} claims parent {} at level {}, which does not list it as a child",
                        fine_id, level, fine_loop.coarse_parent, level + 1
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_loop() -> Loop {
        Loop {
            edges: vec![1, 2, 3],
            centroid: SpatialVector::default(),
            area: 4.0,
            normal: SpatialVector::unit_z(),
            circulation: 0.0,
            surface_type: SurfaceType::Generic,
            component_id: 1,
            span_station_index: 0,
            fine_children: vec![],
            coarse_parent: NONE,
        }
    }

    #[test]
    fn test_characteristic_length_is_sqrt_area() {
        let l = flat_loop();
        assert!((l.characteristic_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_hierarchy_is_rejected() {
        let hierarchy = GridHierarchy::default();
        assert!(matches!(hierarchy.validate(), Err(Error::BadHierarchy(_))));
    }

    #[test]
    fn test_single_level_hierarchy_is_valid() {
        let hierarchy = GridHierarchy { levels: vec![GridLevel::default()] };
        assert!(hierarchy.validate().is_ok());
    }

    #[test]
    fn test_mismatched_child_cover_is_rejected() {
        let mut fine_loop = flat_loop();
        fine_loop.coarse_parent = 1;

        let mut coarse_loop = flat_loop();
        coarse_loop.fine_children = vec![]; // does not list loop 1 as a child

        let hierarchy = GridHierarchy {
            levels: vec![
                GridLevel { loops: vec![fine_loop], ..Default::default() },
                GridLevel { loops: vec![coarse_loop], ..Default::default() },
            ],
        };

        assert!(matches!(hierarchy.validate(), Err(Error::BadHierarchy(_))));
    }
}
