//! Core types for the swerve drive control library.
//!
//! This module provides the fundamental types used throughout the crate:
//! - [`Point2D`]: Chassis-frame module location
//! - [`Pose2D`]: Field-frame robot pose (position + heading)
//! - [`Twist2D`]: Chassis displacement over a control interval
//! - [`ChassisSpeeds`]: Commanded or measured chassis velocity

pub mod math;
mod pose;

pub use pose::{ChassisSpeeds, Point2D, Pose2D, Twist2D};
