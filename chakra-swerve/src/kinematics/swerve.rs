//! Chassis twist ↔ module state transforms.

use crate::core::{ChassisSpeeds, Point2D, Twist2D};

use super::{ModulePosition, ModuleState};

/// Commanded speeds below this magnitude leave the steering angle alone.
const SPEED_EPSILON: f32 = 1e-6;

/// Swerve drive kinematics for a four-module chassis.
///
/// Parameterized by the fixed module mounting locations relative to the
/// chassis center (front-left, front-right, back-left, back-right).
/// Each module's velocity under rigid-body motion is
/// `vᵢ = v_chassis + ω × rᵢ`; the inverse transform evaluates that
/// directly, the forward transform solves the over-determined system in
/// the least-squares sense through a 3×3 normal-equation inverse
/// precomputed at construction.
///
/// The struct remembers the last commanded angle per module so that a
/// zero-speed command holds steering steady instead of flipping
/// nondeterministically (zero before the first nonzero command).
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    /// Module locations in the chassis frame (m).
    locations: [Point2D; 4],
    /// Precomputed (AᵀA)⁻¹ of the stacked 8×3 constraint matrix.
    inv_normal: [[f32; 3]; 3],
    /// Last commanded steering angle per module (rad).
    last_angles: [f32; 4],
}

impl SwerveKinematics {
    /// Create kinematics from the four module locations.
    ///
    /// Locations are in chassis-frame meters, ordered front-left,
    /// front-right, back-left, back-right.
    ///
    /// # Panics
    ///
    /// Panics if the module geometry is degenerate (the stacked
    /// constraint matrix loses rank, e.g. all locations coincident).
    pub fn new(locations: [Point2D; 4]) -> Self {
        // Normal matrix AᵀA for rows [1, 0, -yᵢ], [0, 1, xᵢ]
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_r2 = 0.0;
        for loc in &locations {
            sum_x += loc.x;
            sum_y += loc.y;
            sum_r2 += loc.x * loc.x + loc.y * loc.y;
        }
        let n = [
            [4.0, 0.0, -sum_y],
            [0.0, 4.0, sum_x],
            [-sum_y, sum_x, sum_r2],
        ];

        let inv_normal = invert_symmetric_3x3(&n)
            .expect("degenerate module geometry: constraint matrix is singular");

        Self {
            locations,
            inv_normal,
            last_angles: [0.0; 4],
        }
    }

    /// Module locations this kinematics object was built from.
    #[inline]
    pub fn locations(&self) -> &[Point2D; 4] {
        &self.locations
    }

    /// Inverse kinematics: chassis speeds → module states.
    ///
    /// For each module, evaluates `vᵢ = v + ω × rᵢ`; the commanded
    /// speed is `‖vᵢ‖` and the commanded angle `atan2(vᵢy, vᵢx)`.
    /// Modules whose speed falls below a small epsilon keep their
    /// previous commanded angle.
    pub fn to_module_states(&mut self, speeds: ChassisSpeeds) -> [ModuleState; 4] {
        let mut states = [ModuleState::default(); 4];
        for (i, loc) in self.locations.iter().enumerate() {
            let vx = speeds.vx - speeds.omega * loc.y;
            let vy = speeds.vy + speeds.omega * loc.x;
            let speed = (vx * vx + vy * vy).sqrt();
            if speed < SPEED_EPSILON {
                states[i] = ModuleState::new(0.0, self.last_angles[i]);
            } else {
                let angle = vy.atan2(vx);
                self.last_angles[i] = angle;
                states[i] = ModuleState::new(speed, angle);
            }
        }
        states
    }

    /// Forward kinematics: measured module states → chassis speeds.
    ///
    /// Least-squares solve of the rigid-body constraint through the
    /// precomputed normal-equation inverse.
    pub fn to_chassis_speeds(&self, states: &[ModuleState; 4]) -> ChassisSpeeds {
        let mut b = [0.0f32; 3];
        for (loc, state) in self.locations.iter().zip(states.iter()) {
            let (sin_a, cos_a) = state.angle_rad.sin_cos();
            let vx = state.speed_mps * cos_a;
            let vy = state.speed_mps * sin_a;
            b[0] += vx;
            b[1] += vy;
            b[2] += loc.x * vy - loc.y * vx;
        }
        let v = mat_vec(&self.inv_normal, &b);
        ChassisSpeeds::new(v[0], v[1], v[2])
    }

    /// Forward kinematics on per-module position deltas.
    ///
    /// `deltas` carries the wheel distance travelled since the previous
    /// sample in `distance_m` and the module's current steering angle;
    /// the result is the chassis displacement over the same interval.
    pub fn to_twist(&self, deltas: &[ModulePosition; 4]) -> Twist2D {
        let mut b = [0.0f32; 3];
        for (loc, delta) in self.locations.iter().zip(deltas.iter()) {
            let (sin_a, cos_a) = delta.angle_rad.sin_cos();
            let dx = delta.distance_m * cos_a;
            let dy = delta.distance_m * sin_a;
            b[0] += dx;
            b[1] += dy;
            b[2] += loc.x * dy - loc.y * dx;
        }
        let v = mat_vec(&self.inv_normal, &b);
        Twist2D::new(v[0], v[1], v[2])
    }

    /// Rescale module speeds so none exceeds the attainable maximum.
    ///
    /// If the largest commanded magnitude exceeds `max_speed_mps`, all
    /// four speeds are scaled by `max_speed_mps / max_commanded`,
    /// preserving ratios and signs. A global scale over the whole
    /// four-tuple; never triggered by the yaw component alone.
    pub fn desaturate(states: &mut [ModuleState; 4], max_speed_mps: f32) {
        let max_commanded = states
            .iter()
            .map(|s| s.speed_mps.abs())
            .fold(0.0f32, f32::max);
        if max_commanded > max_speed_mps {
            let scale = max_speed_mps / max_commanded;
            for state in states.iter_mut() {
                state.speed_mps *= scale;
            }
        }
    }
}

/// Invert a symmetric 3×3 matrix by cofactor expansion.
///
/// Returns `None` if the matrix is singular.
fn invert_symmetric_3x3(m: &[[f32; 3]; 3]) -> Option<[[f32; 3]; 3]> {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
    if det.abs() < 1e-9 {
        return None;
    }
    let inv_det = 1.0 / det;

    let c11 = m[0][0] * m[2][2] - m[0][2] * m[2][0];
    let c12 = m[0][1] * m[2][0] - m[0][0] * m[2][1];
    let c22 = m[0][0] * m[1][1] - m[0][1] * m[1][0];

    // Symmetric input gives a symmetric inverse
    Some([
        [c00 * inv_det, c01 * inv_det, c02 * inv_det],
        [c01 * inv_det, c11 * inv_det, c12 * inv_det],
        [c02 * inv_det, c12 * inv_det, c22 * inv_det],
    ])
}

#[inline]
fn mat_vec(m: &[[f32; 3]; 3], v: &[f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    /// Square chassis, 0.762 m wheelbase and track width.
    fn square_kinematics() -> SwerveKinematics {
        SwerveKinematics::new([
            Point2D::new(0.381, 0.381),
            Point2D::new(0.381, -0.381),
            Point2D::new(-0.381, 0.381),
            Point2D::new(-0.381, -0.381),
        ])
    }

    #[test]
    fn test_straight_forward() {
        let mut kin = square_kinematics();
        let states = kin.to_module_states(ChassisSpeeds::new(4.92, 0.0, 0.0));
        for state in &states {
            assert_relative_eq!(state.speed_mps, 4.92, epsilon = 1e-5);
            assert_relative_eq!(state.angle_rad, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_strafe_left() {
        let mut kin = square_kinematics();
        let states = kin.to_module_states(ChassisSpeeds::new(0.0, 2.0, 0.0));
        for state in &states {
            assert_relative_eq!(state.speed_mps, 2.0, epsilon = 1e-5);
            assert_relative_eq!(state.angle_rad, FRAC_PI_2, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_in_place_rotation() {
        let mut kin = square_kinematics();
        let states = kin.to_module_states(ChassisSpeeds::new(0.0, 0.0, PI));

        // ω × r has magnitude ω·‖r‖ at every corner of the square
        let expected_speed = PI * Point2D::new(0.381, 0.381).norm();
        for state in &states {
            assert_relative_eq!(state.speed_mps, expected_speed, epsilon = 1e-4);
        }

        // Wheel directions are tangent to the chassis circle
        assert_relative_eq!(states[0].angle_rad, 3.0 * FRAC_PI_4, epsilon = 1e-5); // FL
        assert_relative_eq!(states[1].angle_rad, FRAC_PI_4, epsilon = 1e-5); // FR
        assert_relative_eq!(states[2].angle_rad, -3.0 * FRAC_PI_4, epsilon = 1e-5); // BL
        assert_relative_eq!(states[3].angle_rad, -FRAC_PI_4, epsilon = 1e-5); // BR
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let mut kin = square_kinematics();
        let cases = [
            ChassisSpeeds::new(1.0, 0.0, 0.0),
            ChassisSpeeds::new(0.0, -2.0, 0.0),
            ChassisSpeeds::new(0.0, 0.0, 1.5),
            ChassisSpeeds::new(1.2, -0.7, 0.9),
            ChassisSpeeds::new(-2.0, 0.4, -2.1),
        ];
        for twist in cases {
            let states = kin.to_module_states(twist);
            let recovered = kin.to_chassis_speeds(&states);
            assert_relative_eq!(recovered.vx, twist.vx, epsilon = 1e-4);
            assert_relative_eq!(recovered.vy, twist.vy, epsilon = 1e-4);
            assert_relative_eq!(recovered.omega, twist.omega, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_zero_speed_holds_previous_angle() {
        let mut kin = square_kinematics();

        // Steer somewhere first
        kin.to_module_states(ChassisSpeeds::new(0.0, 1.0, 0.0));

        // Stop: angles must stay where they were
        let stopped = kin.to_module_states(ChassisSpeeds::new(0.0, 0.0, 0.0));
        for state in &stopped {
            assert_relative_eq!(state.speed_mps, 0.0);
            assert_relative_eq!(state.angle_rad, FRAC_PI_2, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_speed_before_any_command_steers_to_zero() {
        let mut kin = square_kinematics();
        let states = kin.to_module_states(ChassisSpeeds::new(0.0, 0.0, 0.0));
        for state in &states {
            assert_relative_eq!(state.angle_rad, 0.0);
        }
    }

    #[test]
    fn test_desaturate_scales_proportionally() {
        let mut states = [
            ModuleState::new(6.0, 0.0),
            ModuleState::new(5.0, 0.0),
            ModuleState::new(4.0, 0.0),
            ModuleState::new(3.0, 0.0),
        ];
        SwerveKinematics::desaturate(&mut states, 4.0);

        assert_relative_eq!(states[0].speed_mps, 4.0, epsilon = 1e-5);
        assert_relative_eq!(states[1].speed_mps, 4.0 * 5.0 / 6.0, epsilon = 1e-5);
        assert_relative_eq!(states[2].speed_mps, 4.0 * 4.0 / 6.0, epsilon = 1e-5);
        assert_relative_eq!(states[3].speed_mps, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_desaturate_preserves_signs() {
        let mut states = [
            ModuleState::new(-6.0, 0.0),
            ModuleState::new(3.0, 0.0),
            ModuleState::new(-2.0, 0.0),
            ModuleState::new(1.0, 0.0),
        ];
        SwerveKinematics::desaturate(&mut states, 3.0);
        assert_relative_eq!(states[0].speed_mps, -3.0, epsilon = 1e-5);
        assert_relative_eq!(states[1].speed_mps, 1.5, epsilon = 1e-5);
        assert_relative_eq!(states[2].speed_mps, -1.0, epsilon = 1e-5);
        assert_relative_eq!(states[3].speed_mps, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_desaturate_noop_under_limit() {
        let mut states = [
            ModuleState::new(1.0, 0.0),
            ModuleState::new(2.0, 0.0),
            ModuleState::new(3.0, 0.0),
            ModuleState::new(3.5, 0.0),
        ];
        SwerveKinematics::desaturate(&mut states, 4.0);
        assert_relative_eq!(states[3].speed_mps, 3.5);
    }

    #[test]
    fn test_twist_from_deltas_straight() {
        let kin = square_kinematics();
        let deltas = [
            ModulePosition::new(0.5, 0.0),
            ModulePosition::new(0.5, 0.0),
            ModulePosition::new(0.5, 0.0),
            ModulePosition::new(0.5, 0.0),
        ];
        let twist = kin.to_twist(&deltas);
        assert_relative_eq!(twist.dx, 0.5, epsilon = 1e-5);
        assert_relative_eq!(twist.dy, 0.0, epsilon = 1e-6);
        assert_relative_eq!(twist.dtheta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_twist_from_deltas_rotation() {
        let kin = square_kinematics();
        let r = Point2D::new(0.381, 0.381).norm();
        // Each wheel travelled a tenth of a radian along its tangent
        let arc = 0.1 * r;
        let deltas = [
            ModulePosition::new(arc, 3.0 * FRAC_PI_4),
            ModulePosition::new(arc, FRAC_PI_4),
            ModulePosition::new(arc, -3.0 * FRAC_PI_4),
            ModulePosition::new(arc, -FRAC_PI_4),
        ];
        let twist = kin.to_twist(&deltas);
        assert_relative_eq!(twist.dx, 0.0, epsilon = 1e-5);
        assert_relative_eq!(twist.dy, 0.0, epsilon = 1e-5);
        assert_relative_eq!(twist.dtheta, 0.1, epsilon = 1e-5);
    }

    #[test]
    #[should_panic(expected = "degenerate module geometry")]
    fn test_coincident_modules_panic() {
        SwerveKinematics::new([Point2D::new(0.0, 0.0); 4]);
    }
}
