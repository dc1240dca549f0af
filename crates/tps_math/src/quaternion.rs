//! Quaternion for 3D rotations

use crate::vector::Vec3;
use core::ops::{Mul, MulAssign};

/// Quaternion representing a 3D rotation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a new quaternion
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis and angle (radians)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        let axis = axis.normalize_or_zero();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Create from rotation around the Y (up) axis
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(0.0, sin, 0.0, cos)
    }

    /// Yaw-only rotation whose forward (+Z) points along `forward` projected
    /// onto the ground plane. Degenerate directions give identity.
    pub fn look_rotation_y(forward: Vec3) -> Self {
        let flat = forward.with_y(0.0);
        if flat.is_zero() {
            return Self::IDENTITY;
        }
        Self::from_rotation_y(flat.x.atan2(flat.z))
    }

    /// Get the length
    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize the quaternion
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Angle in radians between two rotations
    pub fn angle_between(self, other: Self) -> f32 {
        let dot = self.dot(other).abs().min(1.0);
        2.0 * dot.acos()
    }

    /// Spherical linear interpolation along the shortest arc, `t` clamped to `[0, 1]`
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut dot = self.dot(other);
        let mut other = other;

        if dot < 0.0 {
            other = Self::new(-other.x, -other.y, -other.z, -other.w);
            dot = -dot;
        }

        // Nearly identical: fall back to normalized lerp
        if dot > 0.9995 {
            return Self::new(
                self.x + (other.x - self.x) * t,
                self.y + (other.y - self.y) * t,
                self.z + (other.z - self.z) * t,
                self.w + (other.w - self.w) * t,
            )
            .normalize();
        }

        let theta = dot.min(1.0).acos();
        let sin_theta = theta.sin();
        let s1 = ((1.0 - t) * theta).sin() / sin_theta;
        let s2 = (t * theta).sin() / sin_theta;

        Self::new(
            self.x * s1 + other.x * s2,
            self.y * s1 + other.y * s2,
            self.z * s1 + other.z * s2,
            self.w * s1 + other.w * s2,
        )
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Forward (+Z) direction of this rotation
    #[inline]
    pub fn forward(self) -> Vec3 {
        self.rotate(Vec3::Z)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotation_y_turns_forward_right() {
        let q = Quat::from_rotation_y(FRAC_PI_2);
        let v = q * Vec3::Z;
        assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_rotation_matches_direction() {
        let dir = Vec3::new(-1.0, 3.0, 1.0);
        let fwd = Quat::look_rotation_y(dir).forward();
        let expected = dir.with_y(0.0).normalize_or_zero();
        assert!((fwd - expected).length() < 1e-5);
        assert_eq!(Quat::look_rotation_y(Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn test_slerp_halfway() {
        let q = Quat::IDENTITY.slerp(Quat::from_rotation_y(PI), 0.5);
        let v = q * Vec3::Z;
        assert_abs_diff_eq!(v.x.abs(), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_slerp_endpoints() {
        let target = Quat::from_rotation_y(1.0);
        assert_abs_diff_eq!(Quat::IDENTITY.slerp(target, 1.0).angle_between(target), 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(Quat::IDENTITY.slerp(target, 0.0).angle_between(Quat::IDENTITY), 0.0, epsilon = 1e-2);
    }
}
