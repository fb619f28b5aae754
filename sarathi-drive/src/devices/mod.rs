//! Simulated hardware implementing the core's device traits.
//!
//! A dynamics-level stand-in for the real drivetrain: modules run the
//! same closed loops a motor controller would (velocity PID +
//! feed-forward on the drive motor, continuous-input position PID on
//! the steering motor) over a first-order plant, and the gyro reads the
//! true yaw corrupted by bias and noise.

mod gyro;
mod module;
mod pid;

pub use gyro::SimGyro;
pub use module::PidModule;
pub use pid::Pid;
