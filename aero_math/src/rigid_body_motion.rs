// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Quaternion-based rigid body pose, used to track the position and orientation of rigid
//! component groups (wings, rotors, ...) as they move through a simulation.

use serde::{Serialize, Deserialize};

use crate::spatial_vector::SpatialVector;
use crate::type_aliases::Float;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// A unit quaternion representing an orientation, stored as `w + x*i + y*j + z*k`.
pub struct Quaternion {
    pub w: Float,
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Quaternion {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Builds the quaternion representing a rotation of `angle` radians about `axis`. `axis` is
    /// normalized internally.
    pub fn from_axis_angle(axis: SpatialVector, angle: Float) -> Self {
        let axis = axis.normalize();
        let half_angle = 0.5 * angle;
        let sin_half = half_angle.sin();

        Self {
            w: half_angle.cos(),
            x: axis.x() * sin_half,
            y: axis.y() * sin_half,
            z: axis.z() * sin_half,
        }
    }

    #[inline(always)]
    pub fn conjugate(self) -> Self {
        Self { w: self.w, x: -self.x, y: -self.y, z: -self.z }
    }

    #[inline(always)]
    pub fn norm(self) -> Float {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// The inverse rotation. Equal to the conjugate for a unit quaternion.
    pub fn inverse(self) -> Self {
        let norm_sq = self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z;

        if norm_sq == 0.0 {
            return Self::identity();
        }

        let conj = self.conjugate();

        Self {
            w: conj.w / norm_sq,
            x: conj.x / norm_sq,
            y: conj.y / norm_sq,
            z: conj.z / norm_sq,
        }
    }

    pub fn normalize(self) -> Self {
        let norm = self.norm();

        if norm > 0.0 {
            Self { w: self.w / norm, x: self.x / norm, y: self.y / norm, z: self.z / norm }
        } else {
            Self::identity()
        }
    }

    /// Hamilton product `self * rhs`, i.e. apply `rhs` first, then `self`.
    pub fn multiply(self, rhs: Self) -> Self {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    /// Rotates `point` by this quaternion.
    pub fn rotate(self, point: SpatialVector) -> SpatialVector {
        let p = Self { w: 0.0, x: point.x(), y: point.y(), z: point.z() };

        let rotated = self.multiply(p).multiply(self.conjugate());

        SpatialVector::new(rotated.x, rotated.y, rotated.z)
    }

    /// Spherical linear interpolation between two orientations, `t` in `[0, 1]`.
    pub fn slerp(self, other: Self, t: Float) -> Self {
        let mut other = other;
        let mut dot = self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z;

        // Take the shorter path around the hypersphere.
        if dot < 0.0 {
            other = Self { w: -other.w, x: -other.x, y: -other.y, z: -other.z };
            dot = -dot;
        }

        if dot > 0.9995 {
            // Nearly identical orientations: fall back to linear interpolation.
            let lerp = Self {
                w: self.w + t * (other.w - self.w),
                x: self.x + t * (other.x - self.x),
                y: self.y + t * (other.y - self.y),
                z: self.z + t * (other.z - self.z),
            };

            return lerp.normalize();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;

        let sin_theta_0 = theta_0.sin();
        let sin_theta = theta.sin();

        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Self {
            w: s0 * self.w + s1 * other.w,
            x: s0 * self.x + s1 * other.x,
            y: s0 * self.y + s1 * other.y,
            z: s0 * self.z + s1 * other.z,
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// A rigid body pose: an orientation about an origin, plus the origin's translation.
pub struct RigidPose {
    pub origin: SpatialVector,
    pub orientation: Quaternion,
}

impl RigidPose {
    pub fn identity_at(origin: SpatialVector) -> Self {
        Self { origin, orientation: Quaternion::identity() }
    }

    /// Maps a point given in the body frame (relative to the pose's origin at `t=0`) into world
    /// space.
    pub fn transform_point(&self, body_point: SpatialVector) -> SpatialVector {
        self.origin + self.orientation.rotate(body_point)
    }

    /// Maps a free vector (e.g. a normal) given in the body frame into world space; unlike
    /// [`Self::transform_point`], translation does not apply.
    pub fn transform_direction(&self, body_direction: SpatialVector) -> SpatialVector {
        self.orientation.rotate(body_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quaternion_identity_rotate_is_noop() {
        let q = Quaternion::identity();
        let p = SpatialVector::new(1.0, 2.0, 3.0);

        let rotated = q.rotate(p);

        assert!((rotated.x() - p.x()).abs() < 1e-12);
        assert!((rotated.y() - p.y()).abs() < 1e-12);
        assert!((rotated.z() - p.z()).abs() < 1e-12);
    }

    #[test]
    fn test_quaternion_quarter_turn_about_z() {
        let q = Quaternion::from_axis_angle(SpatialVector::unit_z(), crate::consts::PI / 2.0);
        let rotated = q.rotate(SpatialVector::unit_x());

        assert!(rotated.x().abs() < 1e-10);
        assert!((rotated.y() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_quaternion_inverse_undoes_rotation() {
        let q = Quaternion::from_axis_angle(SpatialVector::new(0.3, 0.6, 0.1), 1.234);
        let p = SpatialVector::new(1.0, -2.0, 0.5);

        let round_tripped = q.inverse().rotate(q.rotate(p));

        assert!((round_tripped.x() - p.x()).abs() < 1e-10);
        assert!((round_tripped.y() - p.y()).abs() < 1e-10);
        assert!((round_tripped.z() - p.z()).abs() < 1e-10);
    }
}
