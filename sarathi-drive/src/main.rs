//! SarathiDrive - Drive control node for a four-module swerve chassis
//!
//! Runs the chakra-swerve drive core against a simulated drivetrain:
//! a 50 Hz control thread converts a scripted command profile into
//! module targets and keeps the pose estimator fed with odometry,
//! while a vision thread pushes delayed, noisy absolute pose solves
//! from a simulated fiducial pipeline. At the end of the run the node
//! reports estimator drift against ground truth.

mod config;
mod devices;
mod error;
mod profile;
mod shared;
mod threads;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use chakra_swerve::Pose2D;
use chakra_swerve::core::math::angle_diff;

use config::SarathiConfig;
use error::Result;
use shared::SharedState;
use threads::spawn_threads;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sarathi_drive=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = if args.len() > 1 {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        SarathiConfig::load(config_path)?
    } else if Path::new("sarathi.toml").exists() {
        info!("Loading configuration from sarathi.toml");
        SarathiConfig::load(Path::new("sarathi.toml"))?
    } else {
        info!("Using default configuration");
        SarathiConfig::default()
    };

    info!("SarathiDrive v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Chassis: {:.2} m/s max, {:.2} rad/s max, {:.3} m wheelbase",
        config.swerve.chassis.max_speed_mps,
        config.swerve.chassis.max_angular_rad_s,
        config.swerve.chassis.wheel_base_m
    );

    let shared = Arc::new(SharedState::new(Pose2D::identity()));
    let handles = spawn_threads(config, Arc::clone(&shared))?;

    // Monitor until the profile finishes or a thread dies
    let check_interval = Duration::from_millis(200);
    loop {
        std::thread::sleep(check_interval);

        if shared.is_profile_complete() {
            info!("Command profile completed");
            break;
        }
        if handles.control.is_finished() || handles.vision.is_finished() {
            warn!("A worker thread exited unexpectedly");
            break;
        }
    }

    shared.signal_shutdown();

    if let Err(e) = handles.control.join() {
        error!("Control thread panicked: {:?}", e);
    }
    if let Err(e) = handles.vision.join() {
        error!("Vision thread panicked: {:?}", e);
    }

    // Final report: how far did the estimate land from ground truth
    let truth = shared.true_pose();
    let estimate = shared.estimated_pose();
    let position_error = ((truth.x - estimate.x).powi(2) + (truth.y - estimate.y).powi(2)).sqrt();
    let heading_error = angle_diff(estimate.theta, truth.theta).abs();

    info!(
        "Ground truth: ({:.3}, {:.3}, {:.3})",
        truth.x, truth.y, truth.theta
    );
    info!(
        "Estimate:     ({:.3}, {:.3}, {:.3})",
        estimate.x, estimate.y, estimate.theta
    );
    info!(
        "Drift: {:.3} m, {:.3} rad after {} vision solves",
        position_error,
        heading_error,
        shared.vision_count()
    );

    info!("SarathiDrive finished");
    Ok(())
}
