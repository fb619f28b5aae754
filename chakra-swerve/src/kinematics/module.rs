//! Per-module state and position types.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::core::math::{angle_diff, normalize_angle};

/// Speed and steering angle of one swerve module.
///
/// Used both as a command (desired state) and as a measurement. Speed
/// is signed meters per second along the wheel-rolling direction; the
/// angle is radians in [-π, π) in the chassis frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Signed wheel speed in m/s
    pub speed_mps: f32,
    /// Steering angle in radians, normalized to [-π, π)
    pub angle_rad: f32,
}

impl ModuleState {
    /// Create a new module state with the angle normalized.
    #[inline]
    pub fn new(speed_mps: f32, angle_rad: f32) -> Self {
        Self {
            speed_mps,
            angle_rad: normalize_angle(angle_rad),
        }
    }

    /// Minimize the steering rotation needed to reach this state.
    ///
    /// If the shortest rotation from `current_angle` to the target
    /// exceeds 90°, the equivalent state with inverted speed and the
    /// angle rotated by π is returned instead, so the wheel never
    /// steers more than a quarter turn.
    pub fn optimize(&self, current_angle: f32) -> ModuleState {
        let delta = angle_diff(current_angle, self.angle_rad);
        if delta.abs() > FRAC_PI_2 {
            ModuleState::new(-self.speed_mps, self.angle_rad + PI)
        } else {
            *self
        }
    }
}

/// Cumulative drive distance and steering angle of one swerve module.
///
/// The distance epoch is arbitrary but stable for the lifetime of the
/// consumer; only differences between successive readings matter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Cumulative signed wheel distance in meters
    pub distance_m: f32,
    /// Steering angle in radians, normalized to [-π, π)
    pub angle_rad: f32,
}

impl ModulePosition {
    /// Create a new module position with the angle normalized.
    #[inline]
    pub fn new(distance_m: f32, angle_rad: f32) -> Self {
        Self {
            distance_m,
            angle_rad: normalize_angle(angle_rad),
        }
    }
}
