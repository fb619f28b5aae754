//! Swerve kinematics.
//!
//! Converts between a chassis twist `(vx, vy, ω)` and the ordered
//! four-tuple of module states (front-left, front-right, back-left,
//! back-right), including steering optimization and wheel-speed
//! desaturation.

mod module;
mod swerve;

pub use module::{ModulePosition, ModuleState};
pub use swerve::SwerveKinematics;
