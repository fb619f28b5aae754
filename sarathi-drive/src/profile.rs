//! Scripted drive command profile.
//!
//! Stands in for the operator input layer: a fixed sequence of
//! normalized chassis commands that sweeps translation, strafing, and
//! rotation so a run exercises the whole drive pipeline.

/// A normalized chassis command in [-1, 1] per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub vx: f32,
    pub vy: f32,
    pub omega: f32,
}

impl DriveCommand {
    pub const STOP: DriveCommand = DriveCommand {
        vx: 0.0,
        vy: 0.0,
        omega: 0.0,
    };
}

/// The command active at profile time `t`, or `None` once the profile
/// has finished.
///
/// Phases: forward, strafe left, arc (translation + rotation), spin in
/// place, settle to a stop.
pub fn command_at(t: f64) -> Option<DriveCommand> {
    let command = match t {
        t if t < 2.0 => DriveCommand {
            vx: 0.4,
            vy: 0.0,
            omega: 0.0,
        },
        t if t < 4.0 => DriveCommand {
            vx: 0.0,
            vy: 0.4,
            omega: 0.0,
        },
        t if t < 6.0 => DriveCommand {
            vx: 0.3,
            vy: 0.0,
            omega: 0.25,
        },
        t if t < 8.0 => DriveCommand {
            vx: 0.0,
            vy: 0.0,
            omega: 0.5,
        },
        t if t < 9.0 => DriveCommand::STOP,
        _ => return None,
    };
    Some(command)
}
