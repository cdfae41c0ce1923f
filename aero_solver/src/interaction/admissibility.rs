// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The far-field admissibility test and the two near-field vetoes (§4.D).

use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

use crate::config::InteractionSettings;
use crate::geometry::{GridLevel, Loop};

/// A candidate loop's centroid offset (the farthest corner node from its centroid) and
/// axis-aligned bounding box, both needed by [`is_admissible`].
fn candidate_extent(level: &GridLevel, candidate: &Loop) -> (Float, SpatialVector, SpatialVector) {
    let inf = aero_math::consts::INFINITY;
    let mut min = SpatialVector::new(inf, inf, inf);
    let mut max = SpatialVector::new(-inf, -inf, -inf);
    let mut centroid_offset: Float = 0.0;

    for &edge_id in &candidate.edges {
        let edge = level.edge(edge_id);

        for &node_id in &edge.nodes {
            let position = level.node(node_id).position;

            min = SpatialVector::new(min.x().min(position.x()), min.y().min(position.y()), min.z().min(position.z()));
            max = SpatialVector::new(max.x().max(position.x()), max.y().max(position.y()), max.z().max(position.z()));

            let offset = (position - candidate.centroid).length();
            if offset > centroid_offset {
                centroid_offset = offset;
            }
        }
    }

    (centroid_offset, min, max)
}

fn is_outside_bounding_box(point: SpatialVector, min: SpatialVector, max: SpatialVector) -> bool {
    point.x() < min.x()
        || point.x() > max.x()
        || point.y() < min.y()
        || point.y() > max.y()
        || point.z() < min.z()
        || point.z() > max.z()
}

/// Whether a level-`ell` candidate loop `q` is far enough from `target` to be treated as a single
/// source at its own level, rather than descended into its children.
///
/// Combines the distance test against `characteristic_length + centroidOffset` with the
/// requirement that `target` lie outside `q`'s bounding box (§4.D): the distance test alone can
/// admit a target that sits inside a coarse loop's own footprint, since the centroid-to-centroid
/// distance says nothing about where in the loop's box the target actually falls.
///
/// A zero characteristic length (degenerate loop) is never admissible, forcing an unconditional
/// descent, per §4.D's documented failure mode.
pub fn is_admissible(level: &GridLevel, target: SpatialVector, candidate: &Loop, far_factor: Float) -> bool {
    let characteristic_length = candidate.characteristic_length();

    if characteristic_length <= 0.0 {
        return false;
    }

    let (centroid_offset, bbox_min, bbox_max) = candidate_extent(level, candidate);
    let distance = (target - candidate.centroid).length();

    far_factor * (characteristic_length + centroid_offset) <= distance && is_outside_bounding_box(target, bbox_min, bbox_max)
}

/// Same-surface near-coplanar veto (VLM mode): two panels on different components, close enough
/// in distance-over-length, and nearly tangent to the source's plane, do not influence each other
/// through the ordinary kernel (their interaction is handled by direct adjacency instead).
pub fn veto_same_surface_near_coplanar(
    target: SpatialVector,
    target_component: usize,
    source: &Loop,
    settings: &InteractionSettings,
) -> bool {
    if source.component_id == target_component {
        return false;
    }

    let length = source.characteristic_length();
    if length <= 0.0 {
        return false;
    }

    let offset = target - source.centroid;
    let distance = offset.length();

    if distance / length > settings.near_field_veto_distance_ratio {
        return false;
    }

    offset.dot(source.normal).abs() <= source.area.sqrt()
}

/// Opposite-facing panel veto (panel mode trailing-edge closure): an upper and lower surface
/// panel meeting at a trailing edge should not directly influence each other through the volume
/// kernel once they are closer than a fraction of the reference length.
pub fn veto_opposite_facing(
    target: SpatialVector,
    target_normal: SpatialVector,
    source: &Loop,
    reference_length: Float,
    settings: &InteractionSettings,
) -> bool {
    if target_normal.dot(source.normal) >= 0.0 {
        return false;
    }

    let distance = (target - source.centroid).length();
    distance <= settings.opposite_facing_veto_ratio * reference_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Edge, Node, SurfaceType, NONE};

    fn loop_at(centroid: SpatialVector, area: Float, component: usize) -> Loop {
        Loop {
            edges: vec![1, 2, 3],
            centroid,
            area,
            normal: SpatialVector::unit_z(),
            circulation: 0.0,
            surface_type: SurfaceType::Generic,
            component_id: component,
            span_station_index: 0,
            fine_children: vec![],
            coarse_parent: NONE,
        }
    }

    /// A level holding a single unit square loop, corners at `(+-0.5, +-0.5, 0)`, so that
    /// `characteristic_length() == 1.0` and `centroidOffset == sqrt(0.5)`.
    fn level_with_unit_square_loop() -> (GridLevel, Loop) {
        let node = |x: Float, y: Float| Node { position: SpatialVector::new(x, y, 0.0), trailing_edge_circulation_jump: 0.0 };
        let edge = |a, b| Edge {
            nodes: [a, b],
            left_loop: 1,
            right_loop: NONE,
            is_trailing_edge: false,
            circulation: 0.0,
            fine_child: NONE,
            coarse_parent: NONE,
        };

        let level = GridLevel {
            nodes: vec![node(-0.5, -0.5), node(0.5, -0.5), node(0.5, 0.5), node(-0.5, 0.5)],
            edges: vec![edge(1, 2), edge(2, 3), edge(3, 4), edge(4, 1)],
            loops: vec![],
        };

        let mut square = loop_at(SpatialVector::default(), 1.0, 1);
        square.edges = vec![1, 2, 3, 4];

        (level, square)
    }

    #[test]
    fn test_far_target_is_admissible() {
        let (level, candidate) = level_with_unit_square_loop();
        assert!(is_admissible(&level, SpatialVector::new(10.0, 0.0, 0.0), &candidate, 5.0));
    }

    #[test]
    fn test_near_target_is_not_admissible() {
        let (level, candidate) = level_with_unit_square_loop();
        assert!(!is_admissible(&level, SpatialVector::new(1.0, 0.0, 0.0), &candidate, 5.0));
    }

    #[test]
    fn test_zero_length_loop_is_never_admissible() {
        let (level, _) = level_with_unit_square_loop();
        let candidate = loop_at(SpatialVector::default(), 0.0, 1);
        assert!(!is_admissible(&level, SpatialVector::new(100.0, 0.0, 0.0), &candidate, 5.0));
    }

    #[test]
    fn test_target_inside_bounding_box_is_never_admissible() {
        let (level, candidate) = level_with_unit_square_loop();
        // Passes the bare centroid-distance test at this far_factor but sits inside the loop's
        // own bounding box, so it must still be rejected.
        assert!(!is_admissible(&level, SpatialVector::new(0.4, 0.0, 0.0), &candidate, 0.1));
    }

    #[test]
    fn test_veto_same_surface_near_coplanar_fires_for_close_coplanar_different_component() {
        let (_, mut source) = level_with_unit_square_loop();
        source.component_id = 2;

        let settings = InteractionSettings::default();
        let target = SpatialVector::new(0.5, 0.0, 0.0);

        assert!(veto_same_surface_near_coplanar(target, 1, &source, &settings));
    }

    #[test]
    fn test_veto_same_surface_near_coplanar_skips_same_component() {
        let (_, mut source) = level_with_unit_square_loop();
        source.component_id = 1;

        let settings = InteractionSettings::default();
        let target = SpatialVector::new(0.5, 0.0, 0.0);

        assert!(!veto_same_surface_near_coplanar(target, 1, &source, &settings));
    }

    #[test]
    fn test_veto_opposite_facing_fires_for_close_opposite_normals() {
        let (_, mut source) = level_with_unit_square_loop();
        source.normal = -SpatialVector::unit_z();

        let settings = InteractionSettings::default();
        let target = SpatialVector::new(0.0, 0.0, 0.1);

        assert!(veto_opposite_facing(target, SpatialVector::unit_z(), &source, 1.0, &settings));
    }

    #[test]
    fn test_veto_opposite_facing_skips_same_facing_normals() {
        let (_, source) = level_with_unit_square_loop();

        let settings = InteractionSettings::default();
        let target = SpatialVector::new(0.0, 0.0, 0.1);

        assert!(!veto_opposite_facing(target, SpatialVector::unit_z(), &source, 1.0, &settings));
    }
}
