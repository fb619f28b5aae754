//! Shared state between the control and vision threads.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use chakra_swerve::Pose2D;

/// Atomic wrapper for Pose2D.
/// Packs x, y into one atomic u64 (each as i32 millimeters) and theta
/// into an atomic u32 (fixed-point, ×10000) for lock-free access.
#[derive(Debug)]
pub struct AtomicPose {
    xy: AtomicU64,
    theta: AtomicU32,
}

impl AtomicPose {
    pub fn new(pose: Pose2D) -> Self {
        let (xy, theta) = Self::pack(pose);
        Self {
            xy: AtomicU64::new(xy),
            theta: AtomicU32::new(theta),
        }
    }

    fn pack(pose: Pose2D) -> (u64, u32) {
        let x_mm = (pose.x * 1000.0) as i32;
        let y_mm = (pose.y * 1000.0) as i32;
        let xy = ((x_mm as u64) << 32) | (y_mm as u32 as u64);
        let theta = (pose.theta * 10000.0) as i32 as u32;
        (xy, theta)
    }

    pub fn load(&self, order: Ordering) -> Pose2D {
        let xy = self.xy.load(order);
        let x_mm = (xy >> 32) as i32;
        let y_mm = xy as i32;
        let theta_fp = self.theta.load(order) as i32;

        Pose2D::new(
            x_mm as f32 / 1000.0,
            y_mm as f32 / 1000.0,
            theta_fp as f32 / 10000.0,
        )
    }

    pub fn store(&self, pose: Pose2D, order: Ordering) {
        let (xy, theta) = Self::pack(pose);
        self.xy.store(xy, order);
        self.theta.store(theta, order);
    }
}

/// Shared state between all threads.
#[derive(Debug)]
pub struct SharedState {
    /// Ground-truth chassis pose (written by the control thread)
    true_pose: AtomicPose,

    /// Current estimator output (written by the control thread)
    estimated_pose: AtomicPose,

    /// Command profile has finished
    profile_complete: AtomicBool,

    /// Shutdown signal for graceful termination
    shutdown: AtomicBool,

    /// Number of vision measurements pushed (for status reporting)
    vision_count: AtomicU32,

    /// Simulation clock (f64 seconds as bits), the timestamp domain
    /// shared by odometry ticks and vision captures
    sim_time_bits: AtomicU64,
}

impl SharedState {
    /// Create new shared state with both poses at the given start.
    pub fn new(start_pose: Pose2D) -> Self {
        Self {
            true_pose: AtomicPose::new(start_pose),
            estimated_pose: AtomicPose::new(start_pose),
            profile_complete: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            vision_count: AtomicU32::new(0),
            sim_time_bits: AtomicU64::new(0),
        }
    }

    pub fn set_sim_time(&self, t: f64) {
        self.sim_time_bits.store(t.to_bits(), Ordering::Release);
    }

    pub fn sim_time(&self) -> f64 {
        f64::from_bits(self.sim_time_bits.load(Ordering::Acquire))
    }

    pub fn true_pose(&self) -> Pose2D {
        self.true_pose.load(Ordering::Acquire)
    }

    pub fn set_true_pose(&self, pose: Pose2D) {
        self.true_pose.store(pose, Ordering::Release);
    }

    pub fn estimated_pose(&self) -> Pose2D {
        self.estimated_pose.load(Ordering::Acquire)
    }

    pub fn set_estimated_pose(&self, pose: Pose2D) {
        self.estimated_pose.store(pose, Ordering::Release);
    }

    pub fn set_profile_complete(&self) {
        self.profile_complete.store(true, Ordering::Release);
    }

    pub fn is_profile_complete(&self) -> bool {
        self.profile_complete.load(Ordering::Acquire)
    }

    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub fn increment_vision_count(&self) {
        self.vision_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn vision_count(&self) -> u32 {
        self.vision_count.load(Ordering::Relaxed)
    }
}
