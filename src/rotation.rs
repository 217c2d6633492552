//! Rotation state expressed in degrees.
//!
//! Rotations are applied per axis as Euler angles in `XYZ` order. They are
//! never composed into a quaternion before reaching the transform: the card's
//! look depends on each axis being set independently.

use glam::Vec3;

/// One of the three rotation axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in slider order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// A rotation as three Euler angles in degrees.
///
/// The control surface conventionally keeps each axis within `[-90, 90]`,
/// but nothing here enforces that range.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationDegrees {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationDegrees {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Builds a rotation from a degree vector.
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Returns the angles as a vector of degrees.
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Converts each axis to radians independently.
    pub fn to_radians(&self) -> Vec3 {
        Vec3::new(
            self.x.to_radians(),
            self.y.to_radians(),
            self.z.to_radians(),
        )
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns a copy with one axis replaced.
    pub fn with_axis(mut self, axis: Axis, degrees: f32) -> Self {
        match axis {
            Axis::X => self.x = degrees,
            Axis::Y => self.y = degrees,
            Axis::Z => self.z = degrees,
        }
        self
    }
}

impl From<Vec3> for RotationDegrees {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn reference_angles_convert_exactly() {
        let cases = [
            (-90.0, -FRAC_PI_2),
            (-45.0, -FRAC_PI_4),
            (0.0, 0.0),
            (45.0, FRAC_PI_4),
            (90.0, FRAC_PI_2),
        ];
        for (degrees, radians) in cases {
            let r = RotationDegrees::new(degrees, degrees, degrees).to_radians();
            assert_relative_eq!(r.x, radians, epsilon = 1e-6);
            assert_relative_eq!(r.y, radians, epsilon = 1e-6);
            assert_relative_eq!(r.z, radians, epsilon = 1e-6);
        }
    }

    #[test]
    fn axes_convert_independently() {
        let r = RotationDegrees::new(90.0, 0.0, -45.0).to_radians();
        assert_relative_eq!(r.x, FRAC_PI_2, epsilon = 1e-6);
        assert_eq!(r.y, 0.0);
        assert_relative_eq!(r.z, -FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn with_axis_replaces_only_that_axis() {
        let r = RotationDegrees::new(1.0, 2.0, 3.0).with_axis(Axis::Y, 20.0);
        assert_eq!(r, RotationDegrees::new(1.0, 20.0, 3.0));
        assert_eq!(r.axis(Axis::Y), 20.0);
    }
}
