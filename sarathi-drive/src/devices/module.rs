//! Closed-loop simulated swerve module.

use std::f32::consts::TAU;

use chakra_swerve::config::ModuleConfig;
use chakra_swerve::core::math::normalize_angle;
use chakra_swerve::hardware::SwerveModule;
use chakra_swerve::{ModulePosition, ModuleState};

use crate::config::SimConfig;

use super::Pid;

/// Simulated module running the same control loops a real motor
/// controller would.
///
/// The drive motor is a first-order plant commanded by velocity PID +
/// feed-forward; the steering motor slews at a duty-limited rate under
/// a position PID with continuous input over [0, 2π). The absolute
/// steering encoder reads the mechanism angle plus an installation
/// offset; the module subtracts the offset before reporting.
#[derive(Debug, Clone)]
pub struct PidModule {
    drive_pid: Pid,
    turn_pid: Pid,
    drive_ff: f32,
    free_speed_mps: f32,
    motor_tau_s: f32,
    steer_rate_rad_s: f32,
    offset_rad: f32,

    // Plant state
    wheel_speed_mps: f32,
    /// Raw absolute encoder angle in [0, 2π).
    raw_angle_rad: f32,
    distance_m: f32,

    target: ModuleState,
}

impl PidModule {
    /// Build a module for slot `index` (front-left = 0 through
    /// back-right = 3) from the drivetrain and plant configuration.
    pub fn new(module_config: &ModuleConfig, sim_config: &SimConfig, index: usize) -> Self {
        let offset_rad = module_config.angular_offsets_rad[index];
        Self {
            drive_pid: Pid::new(
                module_config.driving_p,
                module_config.driving_i,
                module_config.driving_d,
            ),
            turn_pid: Pid::new(
                module_config.turning_p,
                module_config.turning_i,
                module_config.turning_d,
            )
            .with_continuous_input(0.0, TAU),
            drive_ff: module_config.driving_ff(),
            free_speed_mps: module_config.drive_free_speed_mps(),
            motor_tau_s: sim_config.motor_time_constant_s,
            steer_rate_rad_s: sim_config.steer_rate_rad_s,
            offset_rad,
            wheel_speed_mps: 0.0,
            // At rest the mechanism sits where the encoder reads its
            // installation offset (wheel pointing forward)
            raw_angle_rad: offset_rad.rem_euclid(TAU),
            distance_m: 0.0,
            target: ModuleState::default(),
        }
    }

    /// Advance the plant by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        // Drive: feed-forward plus velocity PID into a first-order motor
        let duty = (self.drive_ff * self.target.speed_mps
            + self
                .drive_pid
                .calculate(self.target.speed_mps, self.wheel_speed_mps, dt))
        .clamp(-1.0, 1.0);
        let alpha = (dt / self.motor_tau_s).min(1.0);
        self.wheel_speed_mps += (duty * self.free_speed_mps - self.wheel_speed_mps) * alpha;

        // Steering: position PID with wrap-around over the raw domain
        let setpoint_raw = (self.target.angle_rad + self.offset_rad).rem_euclid(TAU);
        let turn_duty = self
            .turn_pid
            .calculate(setpoint_raw, self.raw_angle_rad, dt)
            .clamp(-1.0, 1.0);
        self.raw_angle_rad =
            (self.raw_angle_rad + turn_duty * self.steer_rate_rad_s * dt).rem_euclid(TAU);

        self.distance_m += self.wheel_speed_mps * dt;
    }

    fn measured_angle(&self) -> f32 {
        normalize_angle(self.raw_angle_rad - self.offset_rad)
    }
}

impl SwerveModule for PidModule {
    fn state(&self) -> ModuleState {
        ModuleState::new(self.wheel_speed_mps, self.measured_angle())
    }

    fn position(&self) -> ModulePosition {
        ModulePosition::new(self.distance_m, self.measured_angle())
    }

    fn set_desired_state(&mut self, desired: ModuleState) {
        self.target = desired.optimize(self.measured_angle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn test_module(index: usize) -> PidModule {
        PidModule::new(&ModuleConfig::default(), &SimConfig::default(), index)
    }

    #[test]
    fn test_starts_at_zero_measured_angle() {
        for index in 0..4 {
            let module = test_module(index);
            assert_relative_eq!(module.state().angle_rad, 0.0, epsilon = 1e-6);
            assert_relative_eq!(module.state().speed_mps, 0.0);
        }
    }

    #[test]
    fn test_drive_converges_to_commanded_speed() {
        let mut module = test_module(0);
        module.set_desired_state(ModuleState::new(2.0, 0.0));
        for _ in 0..100 {
            module.step(0.02);
        }
        assert_relative_eq!(module.state().speed_mps, 2.0, epsilon = 0.05);
        assert!(module.position().distance_m > 0.0);
    }

    #[test]
    fn test_steering_converges_with_offset() {
        // Back-left carries a π offset; the measured angle must still
        // converge to the commanded one
        let mut module = test_module(2);
        module.set_desired_state(ModuleState::new(0.5, FRAC_PI_2));
        for _ in 0..100 {
            module.step(0.02);
        }
        assert_relative_eq!(module.state().angle_rad, FRAC_PI_2, epsilon = 0.01);
    }

    #[test]
    fn test_dispatch_optimizes_target() {
        let mut module = test_module(0);
        module.set_desired_state(ModuleState::new(1.0, 3.0));
        // 3.0 rad from rest exceeds a quarter turn: the module flips
        assert!(module.target.speed_mps < 0.0);
    }
}
