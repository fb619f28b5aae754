//! Fusing pose estimator.
//!
//! Maintains a best-estimate field-frame pose by integrating
//! gyro-corrected swerve odometry every control period and folding in
//! asynchronous absolute pose observations (from a fiducial vision
//! pipeline) at their true capture timestamps.
//!
//! # Structure
//!
//! The estimator keeps two chains:
//!
//! - a **pure odometry chain**: module-position deltas are solved into a
//!   chassis twist, the heading component replaced by the gyro delta,
//!   and the result integrated through the pose exponential. Samples of
//!   this chain are buffered over a retention window.
//! - a **correction anchor**: the last vision-corrected pose together
//!   with the odometry pose at the correction time. The current
//!   estimate is always `anchor ⊕ (odom_at_anchor⁻¹ ⊕ odom_now)`, so
//!   odometry accumulated after a correction is replayed on top of it
//!   by construction.
//!
//! A vision measurement timestamped in the past is matched against the
//! odometry chain interpolated at its capture time, corrected through a
//! per-axis scalar Kalman update (the three pose components are
//! filtered independently over diagonal covariances), and installed as
//! the new anchor. Measurements older than the buffer are dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::core::math::angle_diff;
use crate::core::{Pose2D, Twist2D};
use crate::kinematics::{ModulePosition, SwerveKinematics};

/// An axis with `p + r` below this carries no information; skip it.
const VARIANCE_EPSILON: f32 = 1e-9;

/// Per-axis standard deviations of a vision pose observation.
///
/// `(σx, σy, σθ)` in meters, meters, radians. Typical values are
/// `(4, 4, 8)` for a single-tag solve and `(0.5, 0.5, 1)` for a
/// multi-tag solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionStdDevs {
    /// Standard deviation of the x observation (m)
    pub x_m: f32,
    /// Standard deviation of the y observation (m)
    pub y_m: f32,
    /// Standard deviation of the heading observation (rad)
    pub theta_rad: f32,
}

impl VisionStdDevs {
    /// Create new standard deviations.
    #[inline]
    pub const fn new(x_m: f32, y_m: f32, theta_rad: f32) -> Self {
        Self {
            x_m,
            y_m,
            theta_rad,
        }
    }
}

/// One buffered odometry update.
#[derive(Debug, Clone, Copy)]
struct OdometrySample {
    /// Timestamp on the caller's monotonic clock (s).
    t: f64,
    /// Chassis displacement over the interval ending at `t`.
    twist: Twist2D,
    /// Pure-odometry pose after applying `twist`.
    odom_pose: Pose2D,
}

/// Kalman-filtered planar pose estimator for a four-module swerve drive.
///
/// Single-threaded by itself; the drive controller wraps it in a mutex
/// so the vision pipeline can push measurements from its own thread.
#[derive(Debug, Clone)]
pub struct SwervePoseEstimator {
    kinematics: SwerveKinematics,

    /// Time-ordered odometry history over the retention window.
    samples: VecDeque<OdometrySample>,
    retention_secs: f64,

    /// Pure odometry chain.
    odom_pose: Pose2D,
    prev_gyro: f32,
    prev_positions: [ModulePosition; 4],
    prev_time: Option<f64>,

    /// Last accepted correction (vision fusion or reset).
    base_pose: Pose2D,
    odom_at_base: Pose2D,

    /// Diagonal state covariance over (x, y, θ).
    p: [f32; 3],
    /// Diagonal odometry process variances per second.
    q: [f32; 3],
}

impl SwervePoseEstimator {
    /// Create an estimator with the given baselines.
    ///
    /// `gyro_angle` and `positions` become the reference for the first
    /// update's deltas; `initial_pose` is reported until odometry
    /// arrives. State covariance starts at zero.
    pub fn new(
        kinematics: SwerveKinematics,
        gyro_angle: f32,
        positions: [ModulePosition; 4],
        initial_pose: Pose2D,
        config: &EstimatorConfig,
    ) -> Self {
        let q = [
            config.state_std_dev_x * config.state_std_dev_x,
            config.state_std_dev_y * config.state_std_dev_y,
            config.state_std_dev_theta * config.state_std_dev_theta,
        ];
        let mut estimator = Self {
            kinematics,
            samples: VecDeque::new(),
            retention_secs: config.buffer_retention_secs,
            odom_pose: initial_pose,
            prev_gyro: gyro_angle,
            prev_positions: positions,
            prev_time: None,
            base_pose: initial_pose,
            odom_at_base: initial_pose,
            p: [0.0; 3],
            q,
        };
        estimator.reset_position(gyro_angle, positions, initial_pose);
        estimator
    }

    /// Current best pose estimate.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.compensate(&self.odom_pose)
    }

    /// Current diagonal state covariance over (x, y, θ).
    #[inline]
    pub fn covariance(&self) -> [f32; 3] {
        self.p
    }

    /// Integrate one odometry sample.
    ///
    /// `t` is seconds on the same monotonic clock vision timestamps use.
    /// Heading comes from the gyro delta (authoritative over the
    /// odometry-derived rotation); a stale gyro reading degrades to a
    /// zero heading delta. Returns the updated estimate.
    pub fn update(
        &mut self,
        t: f64,
        gyro_angle: f32,
        positions: [ModulePosition; 4],
    ) -> Pose2D {
        let mut deltas = [ModulePosition::default(); 4];
        for (i, (current, previous)) in
            positions.iter().zip(self.prev_positions.iter()).enumerate()
        {
            deltas[i] = ModulePosition::new(
                current.distance_m - previous.distance_m,
                current.angle_rad,
            );
        }

        let mut twist = self.kinematics.to_twist(&deltas);
        twist.dtheta = angle_diff(self.prev_gyro, gyro_angle);

        self.odom_pose = self.odom_pose.exp(&twist);

        let dt = match self.prev_time {
            Some(prev) => (t - prev).max(0.0) as f32,
            None => 0.0,
        };
        for axis in 0..3 {
            self.p[axis] += self.q[axis] * dt;
        }

        self.samples.push_back(OdometrySample {
            t,
            twist,
            odom_pose: self.odom_pose,
        });
        while let Some(front) = self.samples.front() {
            if front.t < t - self.retention_secs {
                self.samples.pop_front();
            } else {
                break;
            }
        }

        self.prev_gyro = gyro_angle;
        self.prev_positions = positions;
        self.prev_time = Some(t);

        self.pose()
    }

    /// Fuse an absolute pose observation captured at `t_meas`.
    ///
    /// The observation is matched against the estimate reconstructed at
    /// its capture time, corrected per axis with scalar Kalman gains
    /// `k = p / (p + σ²)`, and the buffered odometry accumulated since
    /// `t_meas` is replayed on top of the corrected pose. Measurements
    /// predating the retained history are dropped. Observations with
    /// equal timestamps fuse in submission order, each against the
    /// posterior of the previous.
    pub fn add_vision_measurement(
        &mut self,
        measurement: Pose2D,
        t_meas: f64,
        std_devs: VisionStdDevs,
    ) {
        let oldest = match self.samples.front() {
            Some(sample) => sample.t,
            None => {
                log::warn!(
                    "vision measurement at t={:.3}s dropped: no odometry history",
                    t_meas
                );
                return;
            }
        };
        if t_meas < oldest {
            log::warn!(
                "vision measurement at t={:.3}s predates retained odometry (oldest t={:.3}s), dropped",
                t_meas,
                oldest
            );
            return;
        }

        let odom_at_meas = self.odometry_pose_at(t_meas);
        let estimate = self.compensate(&odom_at_meas);

        let innovation = [
            measurement.x - estimate.x,
            measurement.y - estimate.y,
            angle_diff(estimate.theta, measurement.theta),
        ];
        let r = [
            std_devs.x_m * std_devs.x_m,
            std_devs.y_m * std_devs.y_m,
            std_devs.theta_rad * std_devs.theta_rad,
        ];

        let mut correction = [0.0f32; 3];
        for axis in 0..3 {
            let s = self.p[axis] + r[axis];
            if s < VARIANCE_EPSILON {
                // No information on this axis
                continue;
            }
            let gain = self.p[axis] / s;
            correction[axis] = gain * innovation[axis];
            self.p[axis] *= 1.0 - gain;
        }

        self.base_pose = Pose2D::new(
            estimate.x + correction[0],
            estimate.y + correction[1],
            estimate.theta + correction[2],
        );
        self.odom_at_base = odom_at_meas;

        log::debug!(
            "vision fused at t={:.3}s: innovation ({:.3}, {:.3}, {:.3})",
            t_meas,
            innovation[0],
            innovation[1],
            innovation[2]
        );
    }

    /// Reset to an externally imposed pose.
    ///
    /// Clears the sample buffer, zeroes the state covariance, and
    /// stores the given gyro angle and module positions as the baseline
    /// for subsequent deltas. `pose()` returns `pose` exactly.
    pub fn reset_position(
        &mut self,
        gyro_angle: f32,
        positions: [ModulePosition; 4],
        pose: Pose2D,
    ) {
        self.samples.clear();
        self.odom_pose = pose;
        self.base_pose = pose;
        self.odom_at_base = pose;
        self.p = [0.0; 3];
        self.prev_gyro = gyro_angle;
        self.prev_positions = positions;
        self.prev_time = None;
    }

    /// Apply the last accepted correction to an odometry-chain pose.
    #[inline]
    fn compensate(&self, odom: &Pose2D) -> Pose2D {
        self.base_pose
            .compose(&self.odom_at_base.inverse().compose(odom))
    }

    /// Odometry-chain pose at time `t`, interpolated inside its
    /// bracketing interval by scaling that interval's twist; clamped to
    /// the newest sample for `t` beyond the buffer.
    fn odometry_pose_at(&self, t: f64) -> Pose2D {
        let newest = self.samples.back().expect("sample buffer is non-empty");
        if t >= newest.t {
            return newest.odom_pose;
        }

        // Buffer is small (retention window × tick rate); scan forward
        let idx = self
            .samples
            .iter()
            .position(|s| s.t >= t)
            .unwrap_or(self.samples.len() - 1);
        if idx == 0 {
            return self.samples[0].odom_pose;
        }

        let earlier = &self.samples[idx - 1];
        let later = &self.samples[idx];
        let span = later.t - earlier.t;
        let fraction = if span > 0.0 {
            ((t - earlier.t) / span) as f32
        } else {
            1.0
        };
        earlier.odom_pose.exp(&later.twist.scaled(fraction))
    }
}
