//! Configuration types for the swerve drive core.
//!
//! The robot's fixed parameters (geometry, speed limits, module gearing
//! and gains, estimator noise, vision gates) live in plain structs that
//! deserialize from TOML, so a deployment carries one config file
//! instead of a compile-time constant block.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::Deserialize;

use crate::core::Point2D;
use crate::estimator::VisionStdDevs;

/// Top-level configuration for a swerve drivetrain.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct SwerveConfig {
    #[serde(default)]
    pub chassis: ChassisConfig,
    #[serde(default)]
    pub module: ModuleConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Chassis geometry and command limits.
#[derive(Clone, Debug, Deserialize)]
pub struct ChassisConfig {
    /// Distance between front and back module centers (m)
    #[serde(default = "default_wheel_base")]
    pub wheel_base_m: f32,

    /// Distance between left and right module centers (m)
    #[serde(default = "default_track_width")]
    pub track_width_m: f32,

    /// Maximum chassis (and module) speed (m/s)
    #[serde(default = "default_max_speed")]
    pub max_speed_mps: f32,

    /// Maximum chassis yaw rate (rad/s)
    #[serde(default = "default_max_angular_speed")]
    pub max_angular_rad_s: f32,

    /// Normalized command inputs below this magnitude are zeroed
    #[serde(default = "default_drive_deadband")]
    pub drive_deadband: f32,
}

impl ChassisConfig {
    /// Module mounting locations in the chassis frame, ordered
    /// front-left, front-right, back-left, back-right.
    pub fn module_locations(&self) -> [Point2D; 4] {
        let half_base = self.wheel_base_m / 2.0;
        let half_track = self.track_width_m / 2.0;
        [
            Point2D::new(half_base, half_track),
            Point2D::new(half_base, -half_track),
            Point2D::new(-half_base, half_track),
            Point2D::new(-half_base, -half_track),
        ]
    }
}

/// Idle behavior of a motor controller when commanded to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleMode {
    /// Short the windings and resist motion.
    Brake,
    /// Let the mechanism spin freely.
    Coast,
}

/// Per-module gearing, closed-loop gains, and installation offsets.
///
/// The gains parameterize the module's internal control loops (velocity
/// PID + feed-forward on the drive motor, continuous-input position PID
/// on the steering motor); current limits and idle modes are carried as
/// configuration for the motor-controller layer and are not part of the
/// control contract.
#[derive(Clone, Debug, Deserialize)]
pub struct ModuleConfig {
    /// Wheel diameter (m)
    #[serde(default = "default_wheel_diameter")]
    pub wheel_diameter_m: f32,

    /// Overall drive motor reduction (motor turns per wheel turn)
    #[serde(default = "default_drive_reduction")]
    pub drive_motor_reduction: f32,

    /// Drive motor free speed (rpm)
    #[serde(default = "default_drive_free_speed_rpm")]
    pub drive_free_speed_rpm: f32,

    /// Drive velocity loop proportional gain
    #[serde(default = "default_driving_p")]
    pub driving_p: f32,
    /// Drive velocity loop integral gain
    #[serde(default)]
    pub driving_i: f32,
    /// Drive velocity loop derivative gain
    #[serde(default)]
    pub driving_d: f32,

    /// Steering position loop proportional gain
    #[serde(default = "default_turning_p")]
    pub turning_p: f32,
    /// Steering position loop integral gain
    #[serde(default)]
    pub turning_i: f32,
    /// Steering position loop derivative gain
    #[serde(default)]
    pub turning_d: f32,

    /// Drive motor current limit (A)
    #[serde(default = "default_drive_current_limit")]
    pub drive_current_limit_a: u32,
    /// Steering motor current limit (A)
    #[serde(default = "default_turn_current_limit")]
    pub turn_current_limit_a: u32,

    /// Drive motor idle mode
    #[serde(default = "default_drive_idle_mode")]
    pub drive_idle_mode: IdleMode,
    /// Steering motor idle mode
    #[serde(default = "default_turn_idle_mode")]
    pub turn_idle_mode: IdleMode,

    /// Installation offset of each steering encoder (rad), ordered
    /// front-left, front-right, back-left, back-right; subtracted from
    /// the absolute encoder reading before normalization
    #[serde(default = "default_angular_offsets")]
    pub angular_offsets_rad: [f32; 4],
}

impl ModuleConfig {
    /// Wheel circumference (m).
    #[inline]
    pub fn wheel_circumference_m(&self) -> f32 {
        self.wheel_diameter_m * PI
    }

    /// Meters of wheel travel per drive motor rotation.
    ///
    /// Scales the drive encoder's position reading into meters.
    #[inline]
    pub fn drive_position_factor(&self) -> f32 {
        self.wheel_circumference_m() / self.drive_motor_reduction
    }

    /// Meters per second of wheel speed per drive motor rpm.
    ///
    /// Scales the drive encoder's velocity reading into m/s.
    #[inline]
    pub fn drive_velocity_factor(&self) -> f32 {
        self.drive_position_factor() / 60.0
    }

    /// Free wheel speed at the rim (m/s), the drive feed-forward basis.
    #[inline]
    pub fn drive_free_speed_mps(&self) -> f32 {
        self.drive_free_speed_rpm / 60.0 * self.wheel_circumference_m()
            / self.drive_motor_reduction
    }

    /// Drive velocity feed-forward gain (duty per m/s).
    #[inline]
    pub fn driving_ff(&self) -> f32 {
        1.0 / self.drive_free_speed_mps()
    }
}

/// Pose estimator noise model and history depth.
#[derive(Clone, Debug, Deserialize)]
pub struct EstimatorConfig {
    /// Odometry x standard deviation per √s (m)
    #[serde(default = "default_state_std_dev_xy")]
    pub state_std_dev_x: f32,
    /// Odometry y standard deviation per √s (m)
    #[serde(default = "default_state_std_dev_xy")]
    pub state_std_dev_y: f32,
    /// Odometry heading standard deviation per √s (rad)
    #[serde(default = "default_state_std_dev_theta")]
    pub state_std_dev_theta: f32,

    /// How much odometry history to retain for delayed vision fusion (s)
    #[serde(default = "default_buffer_retention")]
    pub buffer_retention_secs: f64,
}

/// Vision observation noise and acceptance gates.
///
/// The gates are enforced by the vision pipeline before a measurement
/// reaches the estimator; they live here so one config file describes
/// the whole chain.
#[derive(Clone, Debug, Deserialize)]
pub struct VisionConfig {
    /// Observation standard deviations for a single-tag solve
    #[serde(default = "default_single_tag_std_devs")]
    pub single_tag_std_devs: VisionStdDevs,

    /// Observation standard deviations for a multi-tag solve
    #[serde(default = "default_multi_tag_std_devs")]
    pub multi_tag_std_devs: VisionStdDevs,

    /// Maximum accepted solver ambiguity
    #[serde(default = "default_max_ambiguity")]
    pub max_ambiguity: f32,

    /// Maximum accepted |z| of the solved pose (m)
    #[serde(default = "default_max_z_error")]
    pub max_z_error_m: f32,

    /// Maximum accepted roll magnitude (rad)
    #[serde(default = "default_max_roll")]
    pub max_roll_rad: f32,

    /// Maximum accepted pitch magnitude (rad)
    #[serde(default = "default_max_pitch")]
    pub max_pitch_rad: f32,
}

// Chassis defaults
fn default_wheel_base() -> f32 {
    0.762
}
fn default_track_width() -> f32 {
    0.762
}
fn default_max_speed() -> f32 {
    4.92
}
fn default_max_angular_speed() -> f32 {
    2.0 * PI
}
fn default_drive_deadband() -> f32 {
    0.05
}

// Module defaults (MAXSwerve-style module, Vortex drive motor)
fn default_wheel_diameter() -> f32 {
    0.0762
}
fn default_drive_reduction() -> f32 {
    (45.0 * 22.0) / (12.0 * 15.0)
}
fn default_drive_free_speed_rpm() -> f32 {
    6784.0
}
fn default_driving_p() -> f32 {
    0.02
}
fn default_turning_p() -> f32 {
    1.0
}
fn default_drive_current_limit() -> u32 {
    80
}
fn default_turn_current_limit() -> u32 {
    20
}
fn default_drive_idle_mode() -> IdleMode {
    IdleMode::Coast
}
fn default_turn_idle_mode() -> IdleMode {
    IdleMode::Brake
}
fn default_angular_offsets() -> [f32; 4] {
    [-FRAC_PI_2, 0.0, PI, FRAC_PI_2]
}

// Estimator defaults
fn default_state_std_dev_xy() -> f32 {
    0.1
}
fn default_state_std_dev_theta() -> f32 {
    0.1
}
fn default_buffer_retention() -> f64 {
    1.5
}

// Vision defaults
fn default_single_tag_std_devs() -> VisionStdDevs {
    VisionStdDevs::new(4.0, 4.0, 8.0)
}
fn default_multi_tag_std_devs() -> VisionStdDevs {
    VisionStdDevs::new(0.5, 0.5, 1.0)
}
fn default_max_ambiguity() -> f32 {
    0.2
}
fn default_max_z_error() -> f32 {
    0.75
}
fn default_max_roll() -> f32 {
    0.5
}
fn default_max_pitch() -> f32 {
    0.5
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            wheel_base_m: default_wheel_base(),
            track_width_m: default_track_width(),
            max_speed_mps: default_max_speed(),
            max_angular_rad_s: default_max_angular_speed(),
            drive_deadband: default_drive_deadband(),
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_m: default_wheel_diameter(),
            drive_motor_reduction: default_drive_reduction(),
            drive_free_speed_rpm: default_drive_free_speed_rpm(),
            driving_p: default_driving_p(),
            driving_i: 0.0,
            driving_d: 0.0,
            turning_p: default_turning_p(),
            turning_i: 0.0,
            turning_d: 0.0,
            drive_current_limit_a: default_drive_current_limit(),
            turn_current_limit_a: default_turn_current_limit(),
            drive_idle_mode: default_drive_idle_mode(),
            turn_idle_mode: default_turn_idle_mode(),
            angular_offsets_rad: default_angular_offsets(),
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            state_std_dev_x: default_state_std_dev_xy(),
            state_std_dev_y: default_state_std_dev_xy(),
            state_std_dev_theta: default_state_std_dev_theta(),
            buffer_retention_secs: default_buffer_retention(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            single_tag_std_devs: default_single_tag_std_devs(),
            multi_tag_std_devs: default_multi_tag_std_devs(),
            max_ambiguity: default_max_ambiguity(),
            max_z_error_m: default_max_z_error(),
            max_roll_rad: default_max_roll(),
            max_pitch_rad: default_max_pitch(),
        }
    }
}
