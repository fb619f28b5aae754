//! ChakraSwerve - Drive control core for four-module swerve drivetrains
//!
//! Translates commanded chassis motion into per-module wheel speed and
//! steering targets each control period, while fusing wheel odometry,
//! an inertial yaw source, and delayed absolute pose observations into
//! a best-estimate planar pose on a known field.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    drive/                           │  ← Orchestration
//! │        (command pipeline, periodic tick)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  estimator/                         │  ← Pose fusion
//! │     (odometry integration, vision correction)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   hardware/                         │  ← Device abstraction
//! │          (module + IMU traits, simulation)          │
//! └─────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────┐
//! │                  kinematics/                        │  ← Swerve transforms
//! │      (chassis twist ↔ module states, desaturation)  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (pose math, angles)                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Coordinate Frame
//!
//! All coordinates follow the ROS REP-103 convention:
//! - **X-forward**: Positive X is in front of the robot
//! - **Y-left**: Positive Y is to the left of the robot
//! - **Rotation**: Counter-clockwise positive
//!
//! Module order is front-left, front-right, back-left, back-right
//! everywhere a four-tuple appears.
//!
//! # Quick Start
//!
//! ```rust
//! use chakra_swerve::config::SwerveConfig;
//! use chakra_swerve::drive::SwerveDrive;
//! use chakra_swerve::hardware::{SimImu, SimModule};
//!
//! let config = SwerveConfig::default();
//! let modules = [SimModule::new(); 4];
//! let mut drive = SwerveDrive::new(modules, SimImu::new(), &config);
//!
//! // Full speed ahead, robot-relative
//! drive.drive(1.0, 0.0, 0.0, false);
//! drive.periodic(0.02);
//! println!("pose: {:?}", drive.pose());
//! ```

pub mod config;
pub mod core;
pub mod drive;
pub mod estimator;
pub mod hardware;
pub mod kinematics;

// Core types
pub use crate::core::math;
pub use crate::core::{ChassisSpeeds, Point2D, Pose2D, Twist2D};

// Kinematics
pub use crate::kinematics::{ModulePosition, ModuleState, SwerveKinematics};

// Hardware abstraction
pub use crate::hardware::{Imu, SimImu, SimModule, SwerveModule};

// Estimator
pub use crate::estimator::{SwervePoseEstimator, VisionStdDevs};

// Drive controller
pub use crate::drive::{SwerveDrive, VisionSink};

// Configuration
pub use crate::config::{ChassisConfig, EstimatorConfig, ModuleConfig, SwerveConfig, VisionConfig};
