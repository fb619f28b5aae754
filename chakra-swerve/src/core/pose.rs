//! Pose, point, and twist types for planar drive control.
//!
//! Coordinate frame follows ROS REP-103:
//! - X-forward, Y-left, Z-up (right-handed)
//! - Counter-clockwise positive rotation

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;

/// A 2D point in meters.
///
/// Used for module mounting locations expressed in the chassis frame,
/// with the origin at the chassis center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters (forward in ROS convention)
    pub x: f32,
    /// Y coordinate in meters (left in ROS convention)
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean norm (distance from the origin).
    #[inline]
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Robot pose in 2D space.
///
/// Represents position (x, y) in meters and heading (theta) in radians,
/// expressed in the field frame. Theta is normalized to [-π, π).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to [-π, π)
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π).
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Compose two poses: self ⊕ other
    ///
    /// Applies `other` transform relative to `self` frame.
    /// ```text
    /// C = A ⊕ B:
    ///   C.x = A.x + B.x * cos(A.θ) - B.y * sin(A.θ)
    ///   C.y = A.y + B.x * sin(A.θ) + B.y * cos(A.θ)
    ///   C.θ = normalize(A.θ + B.θ)
    /// ```
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose.
    ///
    /// Returns the transform that undoes this pose:
    /// `pose.compose(&pose.inverse()) ≈ Pose2D::identity()`.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// Integrate a body-frame twist onto this pose (the pose exponential).
    ///
    /// Maps a constant-velocity displacement `(dx, dy, dθ)` in the robot
    /// frame to the pose reached after following the corresponding arc.
    /// Below a small `dθ` the arc terms fall back to their second-order
    /// series so straight-line motion stays exact.
    pub fn exp(&self, twist: &Twist2D) -> Pose2D {
        let dtheta = twist.dtheta;
        // sin(θ)/θ and (1-cos(θ))/θ, series-expanded near zero
        let (s, c) = if dtheta.abs() < 1e-6 {
            (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
        } else {
            (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
        };
        let dx = twist.dx * s - twist.dy * c;
        let dy = twist.dx * c + twist.dy * s;
        self.compose(&Pose2D::new(dx, dy, dtheta))
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Chassis displacement over a control interval.
///
/// `(dx, dy)` are meters of travel in the robot frame at the start of
/// the interval, `dtheta` is radians of heading change. Dividing by the
/// interval length gives a velocity twist.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2D {
    /// Forward displacement in meters
    pub dx: f32,
    /// Leftward displacement in meters
    pub dy: f32,
    /// Heading change in radians
    pub dtheta: f32,
}

impl Twist2D {
    /// Create a new twist.
    #[inline]
    pub const fn new(dx: f32, dy: f32, dtheta: f32) -> Self {
        Self { dx, dy, dtheta }
    }

    /// Scale all three components by a fraction.
    ///
    /// Used to take a partial step along a buffered odometry interval
    /// when fusing a measurement timestamped inside it.
    #[inline]
    pub fn scaled(&self, fraction: f32) -> Twist2D {
        Twist2D::new(
            self.dx * fraction,
            self.dy * fraction,
            self.dtheta * fraction,
        )
    }
}

/// Commanded or measured chassis velocity.
///
/// `vx` is forward speed (m/s), `vy` is leftward speed (m/s), `omega`
/// is counter-clockwise yaw rate (rad/s). The frame (robot or field) is
/// carried by context; [`ChassisSpeeds::from_field_relative`] converts
/// a field-frame command into the robot frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity in m/s
    pub vx: f32,
    /// Leftward velocity in m/s
    pub vy: f32,
    /// Counter-clockwise angular velocity in rad/s
    pub omega: f32,
}

impl ChassisSpeeds {
    /// Create new chassis speeds.
    #[inline]
    pub const fn new(vx: f32, vy: f32, omega: f32) -> Self {
        Self { vx, vy, omega }
    }

    /// Convert a field-frame command into the robot frame.
    ///
    /// Rotates the translational components by `-heading`; the yaw rate
    /// is frame-independent.
    #[inline]
    pub fn from_field_relative(field: ChassisSpeeds, heading: f32) -> ChassisSpeeds {
        let (sin_h, cos_h) = heading.sin_cos();
        ChassisSpeeds::new(
            field.vx * cos_h + field.vy * sin_h,
            -field.vx * sin_h + field.vy * cos_h,
            field.omega,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_point_norm_and_distance() {
        let p = Point2D::new(3.0, 4.0);
        assert_relative_eq!(p.norm(), 5.0);
        assert_relative_eq!(p.distance(&Point2D::new(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_pose_new_normalizes_angle() {
        let pose = Pose2D::new(0.0, 0.0, 3.0 * PI);
        assert!(pose.theta.abs() - PI < 1e-5);
    }

    #[test]
    fn test_pose_compose_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&Pose2D::identity());
        assert_relative_eq!(result.x, p.x);
        assert_relative_eq!(result.y, p.y);
        assert_relative_eq!(result.theta, p.theta);
    }

    #[test]
    fn test_pose_inverse_roundtrip() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&p.inverse());
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pose_composition_order() {
        let forward = Pose2D::new(1.0, 0.0, 0.0);
        let rotate = Pose2D::new(0.0, 0.0, FRAC_PI_2);

        let result = rotate.compose(&forward);
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_zero_twist_is_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.exp(&Twist2D::default());
        assert_relative_eq!(result.x, p.x, epsilon = 1e-6);
        assert_relative_eq!(result.y, p.y, epsilon = 1e-6);
        assert_relative_eq!(result.theta, p.theta, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_straight_line() {
        let p = Pose2D::new(0.0, 0.0, FRAC_PI_2);
        let result = p.exp(&Twist2D::new(1.0, 0.0, 0.0));
        // Facing +Y, forward motion lands on the Y axis
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_quarter_arc() {
        // Drive a quarter circle: forward π/2 * r with dθ = π/2 at r = 1
        let p = Pose2D::identity();
        let result = p.exp(&Twist2D::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        // Arc of radius 1 ends at (1, 1) facing +Y
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_matches_many_small_steps() {
        // One big exp step equals many small compose steps
        let twist = Twist2D::new(2.0, 0.5, 1.2);
        let coarse = Pose2D::identity().exp(&twist);

        let n = 1000;
        let mut fine = Pose2D::identity();
        for _ in 0..n {
            fine = fine.exp(&twist.scaled(1.0 / n as f32));
        }
        assert_relative_eq!(fine.x, coarse.x, epsilon = 1e-2);
        assert_relative_eq!(fine.y, coarse.y, epsilon = 1e-2);
        assert_relative_eq!(fine.theta, coarse.theta, epsilon = 1e-2);
    }

    #[test]
    fn test_twist_scaled() {
        let t = Twist2D::new(2.0, -1.0, 0.5);
        let half = t.scaled(0.5);
        assert_relative_eq!(half.dx, 1.0);
        assert_relative_eq!(half.dy, -0.5);
        assert_relative_eq!(half.dtheta, 0.25);
    }

    #[test]
    fn test_field_relative_zero_heading_is_identity() {
        let field = ChassisSpeeds::new(1.0, 0.5, 0.3);
        let robot = ChassisSpeeds::from_field_relative(field, 0.0);
        assert_relative_eq!(robot.vx, 1.0, epsilon = 1e-6);
        assert_relative_eq!(robot.vy, 0.5, epsilon = 1e-6);
        assert_relative_eq!(robot.omega, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_field_relative_quarter_turn() {
        // Robot facing +Y: field-forward becomes robot-rightward (−Y)
        let field = ChassisSpeeds::new(1.0, 0.0, 0.0);
        let robot = ChassisSpeeds::from_field_relative(field, FRAC_PI_2);
        assert_relative_eq!(robot.vx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(robot.vy, -1.0, epsilon = 1e-6);
    }
}
