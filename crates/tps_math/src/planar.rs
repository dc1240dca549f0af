//! Ground-plane helpers for camera-relative movement and facing
//!
//! All angles returned here are in degrees, matching how aim thresholds are
//! tuned. Rotation steps take radians, matching turn rates.

use crate::quaternion::Quat;
use crate::vector::Vec3;
use crate::degrees;

/// Project onto the ground plane and normalize (zero stays zero)
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    v.with_y(0.0).normalize_or_zero()
}

/// Unsigned angle between two directions, in degrees
pub fn angle(from: Vec3, to: Vec3) -> f32 {
    let denom = (from.length_squared() * to.length_squared()).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    let cos = (from.dot(to) / denom).clamp(-1.0, 1.0);
    degrees(cos.acos())
}

/// Signed angle from `from` to `to` around `axis`, in degrees.
/// Turning right around +Y (toward +X from +Z) is positive.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle(from, to);
    if axis.dot(from.cross(to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Rotate direction `from` around +Y toward `to` by at most `max_radians`.
/// The length of `from` is preserved.
pub fn rotate_towards(from: Vec3, to: Vec3, max_radians: f32) -> Vec3 {
    let delta = crate::radians(signed_angle(from.with_y(0.0), to.with_y(0.0), Vec3::Y));
    let step = delta.clamp(-max_radians.abs(), max_radians.abs());
    Quat::from_rotation_y(step) * from
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flatten() {
        let v = flatten(Vec3::new(0.0, 5.0, 2.0));
        assert_eq!(v, Vec3::Z);
        assert_eq!(flatten(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_signed_angle_sign() {
        assert_abs_diff_eq!(signed_angle(Vec3::Z, Vec3::X, Vec3::Y), 90.0, epsilon = 1e-3);
        assert_abs_diff_eq!(signed_angle(Vec3::Z, -Vec3::X, Vec3::Y), -90.0, epsilon = 1e-3);
        assert_abs_diff_eq!(signed_angle(Vec3::Z, Vec3::Z, Vec3::Y), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rotate_towards_limits_step() {
        let step = rotate_towards(Vec3::Z, Vec3::X, 0.1);
        assert_abs_diff_eq!(signed_angle(Vec3::Z, step, Vec3::Y), degrees(0.1), epsilon = 1e-3);

        let done = rotate_towards(Vec3::Z, Vec3::X, 10.0);
        assert!((done - Vec3::X).length() < 1e-5);
    }
}
