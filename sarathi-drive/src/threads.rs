//! Control and vision threads.
//!
//! Two threads share the drive's estimator:
//! - **Control thread** (50 Hz): applies the scripted command, steps
//!   the simulated plant, integrates ground truth, and ticks the
//!   estimator with fresh odometry
//! - **Vision thread** (~8 Hz): samples the ground-truth pose, gates
//!   and corrupts it like a fiducial solver would, and pushes it with
//!   its capture timestamp after the configured latency

use std::array;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use chakra_swerve::drive::{SwerveDrive, VisionSink};
use chakra_swerve::{Pose2D, Twist2D};

use crate::config::SarathiConfig;
use crate::devices::{PidModule, SimGyro};
use crate::error::{Result, SarathiError};
use crate::profile;
use crate::shared::SharedState;

/// Thread handles for the drive node.
pub struct ThreadHandles {
    pub control: JoinHandle<()>,
    pub vision: JoinHandle<()>,
}

/// Spawn the control and vision threads.
pub fn spawn_threads(config: SarathiConfig, shared: Arc<SharedState>) -> Result<ThreadHandles> {
    let modules = array::from_fn(|i| PidModule::new(&config.swerve.module, &config.sim, i));
    let gyro = SimGyro::new(&config.sim);
    let drive = SwerveDrive::new(modules, gyro, &config.swerve);
    let vision_sink = drive.vision_sink();

    let control_shared = Arc::clone(&shared);
    let control_config = config.clone();
    let control = thread::Builder::new()
        .name("control".into())
        .spawn(move || control_loop(drive, control_config, control_shared))
        .map_err(|e| SarathiError::Thread(e.to_string()))?;

    let vision = thread::Builder::new()
        .name("vision".into())
        .spawn(move || vision_loop(vision_sink, config, shared))
        .map_err(|e| SarathiError::Thread(e.to_string()))?;

    Ok(ThreadHandles { control, vision })
}

fn control_loop(
    mut drive: SwerveDrive<PidModule, SimGyro>,
    config: SarathiConfig,
    shared: Arc<SharedState>,
) {
    info!("Control thread started at {} Hz", config.control.loop_hz);

    let period = Duration::from_secs_f64(1.0 / config.control.loop_hz);
    let dt = (1.0 / config.control.loop_hz) as f32;
    let mut t = 0.0f64;
    let mut true_pose = Pose2D::identity();

    while !shared.should_shutdown() {
        let tick_start = Instant::now();

        match profile::command_at(t) {
            Some(command) => drive.drive(
                command.vx,
                command.vy,
                command.omega,
                config.control.field_relative,
            ),
            None => {
                drive.drive(0.0, 0.0, 0.0, false);
                shared.set_profile_complete();
            }
        }

        // Step the plant one period
        for i in 0..4 {
            drive.module_mut(i).step(dt);
        }

        // Ground truth follows the measured module states under the
        // no-slip assumption
        let speeds = drive.measured_speeds();
        true_pose = true_pose.exp(&Twist2D::new(
            speeds.vx * dt,
            speeds.vy * dt,
            speeds.omega * dt,
        ));
        drive.imu_mut().step(speeds.omega, dt);

        t += dt as f64;
        drive.periodic(t);

        shared.set_sim_time(t);
        shared.set_true_pose(true_pose);
        shared.set_estimated_pose(drive.pose());

        if let Some(remaining) = period.checked_sub(tick_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    info!("Control thread finished at t={:.2}s", t);
}

fn vision_loop(sink: VisionSink, config: SarathiConfig, shared: Arc<SharedState>) {
    info!(
        "Vision thread started, latency {:.0} ms",
        config.vision_sim.latency_s * 1000.0
    );

    let mut rng = rand::thread_rng();
    let vision = &config.swerve.vision;

    while !shared.should_shutdown() {
        // Capture the field truth as a solver would see it
        let t_capture = shared.sim_time();
        let truth = shared.true_pose();
        let noise = &config.vision_sim;
        let solved = Pose2D::new(
            truth.x + rng.gen_range(-noise.noise_xy_m..=noise.noise_xy_m),
            truth.y + rng.gen_range(-noise.noise_xy_m..=noise.noise_xy_m),
            truth.theta + rng.gen_range(-noise.noise_theta_rad..=noise.noise_theta_rad),
        );

        // A solver reports how confident it is; gate and weight like the
        // real pipeline
        let ambiguity: f32 = rng.gen_range(0.0..0.4);
        let measurement = if ambiguity > vision.max_ambiguity {
            None
        } else if ambiguity > 0.05 {
            Some(vision.single_tag_std_devs)
        } else {
            Some(vision.multi_tag_std_devs)
        };

        // Deliver after the capture-to-solve latency
        thread::sleep(Duration::from_secs_f64(config.vision_sim.latency_s));

        match measurement {
            Some(std_devs) => {
                sink.add_measurement(solved, t_capture, std_devs);
                shared.increment_vision_count();
                debug!(
                    "vision solve at t={:.2}s: ({:.2}, {:.2}, {:.2}), σx={:.1}",
                    t_capture, solved.x, solved.y, solved.theta, std_devs.x_m
                );
            }
            None => {
                debug!(
                    "vision solve at t={:.2}s rejected: ambiguity {:.2}",
                    t_capture, ambiguity
                );
            }
        }
    }

    info!(
        "Vision thread finished after {} accepted solves",
        shared.vision_count()
    );
}
