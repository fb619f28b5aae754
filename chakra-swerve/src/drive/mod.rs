//! Drive controller.
//!
//! Orchestrates the swerve core each control period: accepts chassis
//! commands, converts them through inverse kinematics with desaturation,
//! dispatches per-module targets, and keeps the pose estimator fed with
//! fresh odometry.
//!
//! One `SwerveDrive` is constructed at startup and owned by the control
//! loop; there is no global instance. The estimator sits behind a
//! single mutex so the vision pipeline can push measurements from its
//! own thread through a cloned [`VisionSink`] — the lock covers the
//! odometry tail of [`SwerveDrive::periodic`], vision fusion, and
//! resets, and reads return value copies.

use std::array;
use std::sync::{Arc, Mutex};

use crate::config::SwerveConfig;
use crate::core::math::apply_deadband;
use crate::core::{ChassisSpeeds, Pose2D};
use crate::estimator::{SwervePoseEstimator, VisionStdDevs};
use crate::hardware::{Imu, SwerveModule};
use crate::kinematics::SwerveKinematics;

/// Four-module swerve drive controller.
///
/// Generic over the module and IMU drivers so the same pipeline runs on
/// real hardware and under simulation.
pub struct SwerveDrive<M: SwerveModule, I: Imu> {
    modules: [M; 4],
    imu: I,
    kinematics: SwerveKinematics,
    estimator: Arc<Mutex<SwervePoseEstimator>>,
    max_speed_mps: f32,
    max_angular_rad_s: f32,
    deadband: f32,
}

impl<M: SwerveModule, I: Imu> SwerveDrive<M, I> {
    /// Create a drive from its modules, IMU, and configuration.
    ///
    /// Modules are ordered front-left, front-right, back-left,
    /// back-right. The estimator starts at the field origin; call
    /// [`SwerveDrive::reset_odometry`] to install a known pose.
    pub fn new(modules: [M; 4], imu: I, config: &SwerveConfig) -> Self {
        let kinematics = SwerveKinematics::new(config.chassis.module_locations());
        let positions = array::from_fn(|i| modules[i].position());
        let estimator = SwervePoseEstimator::new(
            kinematics.clone(),
            imu.yaw(),
            positions,
            Pose2D::identity(),
            &config.estimator,
        );
        Self {
            modules,
            imu,
            kinematics,
            estimator: Arc::new(Mutex::new(estimator)),
            max_speed_mps: config.chassis.max_speed_mps,
            max_angular_rad_s: config.chassis.max_angular_rad_s,
            deadband: config.chassis.drive_deadband,
        }
    }

    /// Drive from normalized command inputs.
    ///
    /// `vx`, `vy`, `omega` are in [-1, 1]; a configured deadband zeroes
    /// small inputs, then the command is scaled by the chassis maxima.
    /// With `field_relative` the translation is interpreted in the
    /// field frame and rotated into the robot frame by the current
    /// estimated heading.
    pub fn drive(&mut self, vx: f32, vy: f32, omega: f32, field_relative: bool) {
        debug_assert!(
            vx.is_finite() && vy.is_finite() && omega.is_finite(),
            "non-finite drive command"
        );
        let speeds = ChassisSpeeds::new(
            apply_deadband(vx, self.deadband) * self.max_speed_mps,
            apply_deadband(vy, self.deadband) * self.max_speed_mps,
            apply_deadband(omega, self.deadband) * self.max_angular_rad_s,
        );
        let speeds = if field_relative {
            ChassisSpeeds::from_field_relative(speeds, self.heading())
        } else {
            speeds
        };
        self.drive_speeds(speeds);
    }

    /// Drive from already-scaled chassis speeds in the robot frame.
    pub fn drive_speeds(&mut self, speeds: ChassisSpeeds) {
        let mut states = self.kinematics.to_module_states(speeds);
        SwerveKinematics::desaturate(&mut states, self.max_speed_mps);
        for (module, state) in self.modules.iter_mut().zip(states) {
            module.set_desired_state(state);
        }
    }

    /// Periodic odometry tick.
    ///
    /// Samples the IMU and the four module positions and advances the
    /// estimator. Runs at the host cadence (nominally 50 Hz); the last
    /// drive command is not re-applied — commands are edge-triggered by
    /// callers.
    pub fn periodic(&mut self, t: f64) {
        let yaw = self.imu.yaw();
        let positions = array::from_fn(|i| self.modules[i].position());
        self.estimator
            .lock()
            .expect("pose estimator lock poisoned")
            .update(t, yaw, positions);
    }

    /// Current estimated field-frame pose.
    pub fn pose(&self) -> Pose2D {
        self.estimator
            .lock()
            .expect("pose estimator lock poisoned")
            .pose()
    }

    /// Current estimated heading (rad).
    pub fn heading(&self) -> f32 {
        self.pose().theta
    }

    /// Chassis speeds measured from the module states.
    pub fn measured_speeds(&self) -> ChassisSpeeds {
        let states = array::from_fn(|i| self.modules[i].state());
        self.kinematics.to_chassis_speeds(&states)
    }

    /// Reset the estimator to a known pose.
    pub fn reset_odometry(&mut self, pose: Pose2D) {
        let yaw = self.imu.yaw();
        let positions = array::from_fn(|i| self.modules[i].position());
        self.estimator
            .lock()
            .expect("pose estimator lock poisoned")
            .reset_position(yaw, positions, pose);
    }

    /// Fuse an absolute vision pose observation.
    pub fn add_vision_measurement(&self, pose: Pose2D, t_meas: f64, std_devs: VisionStdDevs) {
        self.estimator
            .lock()
            .expect("pose estimator lock poisoned")
            .add_vision_measurement(pose, t_meas, std_devs);
    }

    /// Handle for pushing vision measurements from another thread.
    pub fn vision_sink(&self) -> VisionSink {
        VisionSink {
            estimator: Arc::clone(&self.estimator),
        }
    }

    /// Access a module driver (front-left = 0 through back-right = 3).
    pub fn module(&self, index: usize) -> &M {
        &self.modules[index]
    }

    /// Mutable access to a module driver.
    ///
    /// Host code that services its drivers between ticks (a simulated
    /// plant stepping its physics, a real driver flushing telemetry)
    /// reaches them here.
    pub fn module_mut(&mut self, index: usize) -> &mut M {
        &mut self.modules[index]
    }

    /// Mutable access to the IMU driver.
    pub fn imu_mut(&mut self) -> &mut I {
        &mut self.imu
    }
}

/// Cloneable cross-thread handle onto the drive's estimator.
///
/// The vision pipeline holds one of these and pushes accepted pose
/// solves without touching the rest of the drive.
#[derive(Clone)]
pub struct VisionSink {
    estimator: Arc<Mutex<SwervePoseEstimator>>,
}

impl VisionSink {
    /// Fuse an absolute pose observation captured at `t_meas`.
    pub fn add_measurement(&self, pose: Pose2D, t_meas: f64, std_devs: VisionStdDevs) {
        if let Ok(mut estimator) = self.estimator.lock() {
            estimator.add_vision_measurement(pose, t_meas, std_devs);
        }
    }
}
