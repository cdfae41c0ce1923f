// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use super::*;

impl SpatialVector {
    /// Rotates the vector by `angle` radians about `axis` (assumed normalized), using
    /// Rodrigues' rotation formula.
    ///
    /// Source: <https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula>
    pub fn rotate_about_axis(self, axis: Self, angle: Float) -> Self {
        let cos_angle = angle.cos();
        let sin_angle = angle.sin();

        self * cos_angle
            + axis.cross(self) * sin_angle
            + axis * (axis.dot(self) * (1.0 - cos_angle))
    }

    /// Reflects the vector across the plane through the origin with the given unit normal.
    pub fn reflect_across_plane(self, plane_normal: Self) -> Self {
        self - plane_normal * (2.0 * self.dot(plane_normal))
    }

    /// Translates and rotates the vector as a rigid body: rotate about `axis` through `origin`,
    /// then translate by `origin_to_new_origin`.
    pub fn rigid_transform(
        self,
        origin: Self,
        axis: Self,
        angle: Float,
        origin_to_new_origin: Self,
    ) -> Self {
        let relative = self - origin;
        let rotated = relative.rotate_about_axis(axis, angle);

        origin + rotated + origin_to_new_origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_about_axis_quarter_turn() {
        let v = SpatialVector::unit_x();
        let rotated = v.rotate_about_axis(SpatialVector::unit_z(), crate::consts::PI / 2.0);

        assert!((rotated.x()).abs() < 1e-10);
        assert!((rotated.y() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_reflect_across_plane() {
        let v = SpatialVector::new(1.0, 2.0, 3.0);
        let reflected = v.reflect_across_plane(SpatialVector::unit_y());

        assert_eq!(reflected, SpatialVector::new(1.0, -2.0, 3.0));
    }
}
