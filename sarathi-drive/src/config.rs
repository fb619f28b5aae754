//! Configuration loading for SarathiDrive

use std::path::Path;

use serde::Deserialize;

use chakra_swerve::config::SwerveConfig;

use crate::error::Result;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize, Default)]
pub struct SarathiConfig {
    /// Drivetrain parameters handed to the swerve core
    #[serde(default)]
    pub swerve: SwerveConfig,

    /// Control loop settings
    #[serde(default)]
    pub control: ControlConfig,

    /// Simulated plant parameters
    #[serde(default)]
    pub sim: SimConfig,

    /// Simulated vision pipeline parameters
    #[serde(default)]
    pub vision_sim: VisionSimConfig,
}

/// Control loop settings
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Control loop rate (Hz, default 50)
    #[serde(default = "default_loop_hz")]
    pub loop_hz: f64,

    /// Drive field-relative by default
    #[serde(default = "default_field_relative")]
    pub field_relative: bool,
}

/// Simulated plant parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SimConfig {
    /// Drive motor first-order time constant (s)
    #[serde(default = "default_motor_time_constant")]
    pub motor_time_constant_s: f32,

    /// Maximum steering rate (rad/s)
    #[serde(default = "default_steer_rate")]
    pub steer_rate_rad_s: f32,

    /// Constant gyro bias (rad/s)
    #[serde(default = "default_gyro_bias")]
    pub gyro_bias_rad_s: f32,

    /// Gyro reading noise, uniform half-width (rad)
    #[serde(default = "default_gyro_noise")]
    pub gyro_noise_rad: f32,
}

/// Simulated vision pipeline parameters
#[derive(Clone, Debug, Deserialize)]
pub struct VisionSimConfig {
    /// Capture-to-delivery latency (s)
    #[serde(default = "default_vision_latency")]
    pub latency_s: f64,

    /// Position noise, uniform half-width (m)
    #[serde(default = "default_vision_noise_xy")]
    pub noise_xy_m: f32,

    /// Heading noise, uniform half-width (rad)
    #[serde(default = "default_vision_noise_theta")]
    pub noise_theta_rad: f32,
}

fn default_loop_hz() -> f64 {
    50.0
}
fn default_field_relative() -> bool {
    true
}
fn default_motor_time_constant() -> f32 {
    0.1
}
fn default_steer_rate() -> f32 {
    15.0
}
fn default_gyro_bias() -> f32 {
    0.002
}
fn default_gyro_noise() -> f32 {
    0.001
}
fn default_vision_latency() -> f64 {
    0.12
}
fn default_vision_noise_xy() -> f32 {
    0.04
}
fn default_vision_noise_theta() -> f32 {
    0.02
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_hz: default_loop_hz(),
            field_relative: default_field_relative(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            motor_time_constant_s: default_motor_time_constant(),
            steer_rate_rad_s: default_steer_rate(),
            gyro_bias_rad_s: default_gyro_bias(),
            gyro_noise_rad: default_gyro_noise(),
        }
    }
}

impl Default for VisionSimConfig {
    fn default() -> Self {
        Self {
            latency_s: default_vision_latency(),
            noise_xy_m: default_vision_noise_xy(),
            noise_theta_rad: default_vision_noise_theta(),
        }
    }
}

impl SarathiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SarathiConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
