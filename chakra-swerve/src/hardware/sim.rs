//! Ideal simulated devices.
//!
//! Kinematically perfect stand-ins for the module and IMU drivers:
//! a commanded state is achieved instantly and integrated exactly.
//! Used by the crate's own tests and available to callers that want a
//! deterministic plant (a dynamics-level simulation lives with the
//! application, not here).

use crate::core::math::normalize_angle;
use crate::kinematics::{ModulePosition, ModuleState};

use super::{Imu, SwerveModule};

/// Ideal swerve module: tracks its commanded state perfectly.
///
/// Call [`SimModule::step`] with the loop period to integrate wheel
/// distance at the current speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimModule {
    state: ModuleState,
    distance_m: f32,
}

impl SimModule {
    /// Create a module at rest with zero accumulated distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the wheel by `dt` seconds at the current speed.
    pub fn step(&mut self, dt: f32) {
        self.distance_m += self.state.speed_mps * dt;
    }
}

impl SwerveModule for SimModule {
    fn state(&self) -> ModuleState {
        self.state
    }

    fn position(&self) -> ModulePosition {
        ModulePosition::new(self.distance_m, self.state.angle_rad)
    }

    fn set_desired_state(&mut self, desired: ModuleState) {
        // Shortest-rotation optimization against the measured angle,
        // then the target is reached instantly
        self.state = desired.optimize(self.state.angle_rad);
    }
}

/// Ideal yaw source driven externally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimImu {
    yaw_rad: f32,
    yaw_rate_rad_s: f32,
}

impl SimImu {
    /// Create an IMU reading zero yaw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the yaw directly (radians).
    pub fn set_yaw(&mut self, yaw_rad: f32) {
        self.yaw_rad = normalize_angle(yaw_rad);
    }

    /// Set the yaw rate (rad/s).
    pub fn set_yaw_rate(&mut self, rate_rad_s: f32) {
        self.yaw_rate_rad_s = rate_rad_s;
    }

    /// Integrate the current yaw rate over `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.yaw_rad = normalize_angle(self.yaw_rad + self.yaw_rate_rad_s * dt);
    }
}

impl Imu for SimImu {
    fn yaw(&self) -> f32 {
        self.yaw_rad
    }

    fn yaw_rate(&self) -> f32 {
        self.yaw_rate_rad_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_sim_module_tracks_command() {
        let mut module = SimModule::new();
        module.set_desired_state(ModuleState::new(2.0, 0.5));
        assert_relative_eq!(module.state().speed_mps, 2.0);
        assert_relative_eq!(module.state().angle_rad, 0.5);
    }

    #[test]
    fn test_sim_module_integrates_distance() {
        let mut module = SimModule::new();
        module.set_desired_state(ModuleState::new(2.0, 0.0));
        for _ in 0..50 {
            module.step(0.02);
        }
        assert_relative_eq!(module.position().distance_m, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sim_module_optimizes_on_dispatch() {
        let mut module = SimModule::new();
        // Target nearly opposite the measured angle: module flips speed
        module.set_desired_state(ModuleState::new(1.0, PI - 0.1));
        assert_relative_eq!(module.state().speed_mps, -1.0);
        assert_relative_eq!(module.state().angle_rad, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_sim_imu_integrates_rate() {
        let mut imu = SimImu::new();
        imu.set_yaw_rate(1.0);
        for _ in 0..50 {
            imu.step(0.02);
        }
        assert_relative_eq!(imu.yaw(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sim_imu_wraps() {
        let mut imu = SimImu::new();
        imu.set_yaw(PI - 0.05);
        imu.set_yaw_rate(10.0);
        imu.step(0.02);
        // 0.2 rad past the boundary wraps negative
        assert!(imu.yaw() < 0.0);
    }
}
