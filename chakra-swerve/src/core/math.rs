//! Angle utilities.
//!
//! All angles are in radians. Coordinate frame follows ROS REP-103:
//! - X-forward, Y-left, Z-up
//! - Counter-clockwise positive rotation

use std::f32::consts::PI;

/// Two times PI (full circle in radians).
pub const TWO_PI: f32 = 2.0 * PI;

/// Normalize angle to [-π, π).
///
/// # Example
/// ```
/// use chakra_swerve::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// // Values near ±π may normalize to either +π or -π due to floating-point
/// assert!(normalize_angle(3.0 * PI).abs() - PI < 1e-5);
/// assert!((normalize_angle(PI / 2.0) - PI / 2.0).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TWO_PI;
    if a >= PI {
        a -= TWO_PI;
    } else if a < -PI {
        a += TWO_PI;
    }
    a
}

/// Compute the signed angular difference between two angles.
///
/// Returns the shortest angular distance from `from` to `to`,
/// in the range [-π, π). Positive result means counter-clockwise
/// rotation from `from` to `to`.
///
/// # Example
/// ```
/// use chakra_swerve::core::math::angle_diff;
/// use std::f32::consts::PI;
///
/// let diff = angle_diff(0.0, PI / 2.0);
/// assert!((diff - PI / 2.0).abs() < 1e-6);
///
/// // Crossing the -π/π boundary takes the short way around
/// let diff = angle_diff(-0.9 * PI, 0.9 * PI);
/// assert!((diff - (-0.2 * PI)).abs() < 1e-5);
/// ```
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Apply a symmetric deadband around zero.
///
/// Inputs with magnitude below `band` map to zero; everything else
/// passes through unchanged.
#[inline]
pub fn apply_deadband(value: f32, band: f32) -> f32 {
    if value.abs() < band { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(0.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(TWO_PI), 0.0, epsilon = 1e-6);
        // At ±π boundary, floating-point may give +π or -π; both are valid
        assert!(normalize_angle(PI).abs() - PI < 1e-6);
        assert!(normalize_angle(3.0 * PI).abs() - PI < 1e-5);
        assert_relative_eq!(normalize_angle(PI / 2.0), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(-PI / 2.0), -PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(2.5 * PI), 0.5 * PI, epsilon = 1e-5);
    }

    #[test]
    fn test_angle_diff() {
        assert_relative_eq!(angle_diff(0.0, PI / 2.0), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(angle_diff(PI / 2.0, 0.0), -PI / 2.0, epsilon = 1e-6);

        // Crossing boundary
        assert_relative_eq!(angle_diff(-0.9 * PI, 0.9 * PI), -0.2 * PI, epsilon = 1e-5);
        assert_relative_eq!(angle_diff(0.9 * PI, -0.9 * PI), 0.2 * PI, epsilon = 1e-5);
    }

    #[test]
    fn test_apply_deadband() {
        assert_eq!(apply_deadband(0.03, 0.05), 0.0);
        assert_eq!(apply_deadband(-0.03, 0.05), 0.0);
        assert_eq!(apply_deadband(0.5, 0.05), 0.5);
        assert_eq!(apply_deadband(-0.5, 0.05), -0.5);
    }
}
