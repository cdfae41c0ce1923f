// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Rigid body groups of components sharing one motion path (§3).

use aero_math::rigid_body_motion::{Quaternion, RigidPose};
use aero_math::spatial_vector::SpatialVector;
use aero_math::type_aliases::Float;

#[derive(Debug, Clone)]
/// A rigid body of components (wings, rotors, control surfaces) that share one rotation/
/// translation path.
pub struct ComponentGroup {
    /// Rotation rate about `axis`, in radians per unit time.
    pub omega: Float,
    pub axis: SpatialVector,
    pub origin_at_t0: SpatialVector,
    pub is_rotor: bool,
    current_origin: SpatialVector,
    orientation: Quaternion,
    rolling_average_force: SpatialVector,
    rolling_average_sample_count: usize,
}

impl ComponentGroup {
    pub fn new(omega: Float, axis: SpatialVector, origin: SpatialVector, is_rotor: bool) -> Self {
        Self {
            omega,
            axis,
            origin_at_t0: origin,
            is_rotor,
            current_origin: origin,
            orientation: Quaternion::identity(),
            rolling_average_force: SpatialVector::default(),
            rolling_average_sample_count: 0,
        }
    }

    /// Advances the group's orientation by one time step, composing an incremental quaternion
    /// built from `omega * dt` about `axis` onto the current orientation. The inverse is derived
    /// from the conjugate rather than integrated separately, so it cannot drift out of sync
    /// (§3.A).
    pub fn advance(&mut self, dt: Float) {
        let increment = Quaternion::from_axis_angle(self.axis, self.omega * dt);
        self.orientation = increment.multiply(self.orientation).normalize();
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn inverse_orientation(&self) -> Quaternion {
        self.orientation.conjugate()
    }

    pub fn pose(&self) -> RigidPose {
        RigidPose { origin: self.current_origin, orientation: self.orientation }
    }

    pub fn set_translation(&mut self, new_origin: SpatialVector) {
        self.current_origin = new_origin;
    }

    /// Folds one step's net aerodynamic force into the group's rolling average, used for
    /// steady-state reduction of unsteady runs over the slowest rotor's period (§4.K).
    pub fn accumulate_force_sample(&mut self, force: SpatialVector, samples_per_period: usize) {
        if self.rolling_average_sample_count >= samples_per_period {
            self.rolling_average_force = SpatialVector::default();
            self.rolling_average_sample_count = 0;
        }

        let n = self.rolling_average_sample_count as Float;
        self.rolling_average_force = (self.rolling_average_force * n + force) / (n + 1.0);
        self.rolling_average_sample_count += 1;
    }

    pub fn rolling_average_force(&self) -> SpatialVector {
        self.rolling_average_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_orientation_undoes_advance() {
        let mut group = ComponentGroup::new(1.0, SpatialVector::unit_z(), SpatialVector::default(), false);
        group.advance(0.3);

        let p = SpatialVector::new(1.0, 0.0, 0.0);
        let rotated = group.orientation().rotate(p);
        let back = group.inverse_orientation().rotate(rotated);

        assert!((back.x() - p.x()).abs() < 1e-10);
        assert!((back.y() - p.y()).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_average_resets_after_full_period() {
        let mut group = ComponentGroup::new(0.0, SpatialVector::unit_z(), SpatialVector::default(), true);

        group.accumulate_force_sample(SpatialVector::new(10.0, 0.0, 0.0), 2);
        group.accumulate_force_sample(SpatialVector::new(20.0, 0.0, 0.0), 2);
        assert!((group.rolling_average_force().x() - 15.0).abs() < 1e-10);

        group.accumulate_force_sample(SpatialVector::new(0.0, 0.0, 0.0), 2);
        assert!((group.rolling_average_force().x() - 0.0).abs() < 1e-10);
    }
}
