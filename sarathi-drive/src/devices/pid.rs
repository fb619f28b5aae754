//! Proportional-integral-derivative controller.

/// A PID controller with optional continuous (wrapping) input.
///
/// Continuous input treats the measurement range as a circle, so a
/// setpoint just across the wrap boundary produces a small error in
/// the short direction rather than a near-full-range correction. Used
/// by the steering loop over [0, 2π).
#[derive(Debug, Clone)]
pub struct Pid {
    kp: f32,
    ki: f32,
    kd: f32,
    /// Input range (min, max) for wrap-around, if continuous.
    continuous: Option<(f32, f32)>,
    /// Symmetric output clamp.
    output_limit: f32,
    i_sum: f32,
    prev_error: Option<f32>,
}

impl Pid {
    /// Create a controller with the given gains and unit output clamp.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            continuous: None,
            output_limit: 1.0,
            i_sum: 0.0,
            prev_error: None,
        }
    }

    /// Treat the input as wrapping over `[min, max)`.
    pub fn with_continuous_input(mut self, min: f32, max: f32) -> Self {
        self.continuous = Some((min, max));
        self
    }

    /// Clamp the output to `[-limit, limit]`.
    pub fn with_output_limit(mut self, limit: f32) -> Self {
        self.output_limit = limit;
        self
    }

    /// Clear accumulated state.
    pub fn reset(&mut self) {
        self.i_sum = 0.0;
        self.prev_error = None;
    }

    /// Compute the control output for one period of `dt` seconds.
    pub fn calculate(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        let mut error = setpoint - measurement;
        if let Some((min, max)) = self.continuous {
            let range = max - min;
            error %= range;
            if error > range / 2.0 {
                error -= range;
            } else if error < -range / 2.0 {
                error += range;
            }
        }

        self.i_sum += error * dt;
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let output = self.kp * error + self.ki * self.i_sum + self.kd * derivative;
        output.clamp(-self.output_limit, self.output_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_proportional_response() {
        let mut pid = Pid::new(0.5, 0.0, 0.0).with_output_limit(10.0);
        assert_relative_eq!(pid.calculate(2.0, 0.0, 0.02), 1.0);
        assert_relative_eq!(pid.calculate(2.0, 1.0, 0.02), 0.5);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = Pid::new(10.0, 0.0, 0.0);
        assert_relative_eq!(pid.calculate(100.0, 0.0, 0.02), 1.0);
        assert_relative_eq!(pid.calculate(-100.0, 0.0, 0.02), -1.0);
    }

    #[test]
    fn test_continuous_input_takes_short_way() {
        let mut pid = Pid::new(1.0, 0.0, 0.0)
            .with_continuous_input(0.0, TAU)
            .with_output_limit(10.0);
        // Setpoint 0.1 rad, measurement just below a full turn: the
        // short way is +0.2, not -6.08
        let out = pid.calculate(0.1, TAU - 0.1, 0.02);
        assert_relative_eq!(out, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_continuous_input_half_turn() {
        let mut pid = Pid::new(1.0, 0.0, 0.0)
            .with_continuous_input(0.0, TAU)
            .with_output_limit(10.0);
        let out = pid.calculate(PI + 0.1, 0.0, 0.02);
        // Just past half a turn wraps negative
        assert!(out < 0.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = Pid::new(0.0, 1.0, 0.0).with_output_limit(10.0);
        pid.calculate(1.0, 0.0, 0.5);
        let out = pid.calculate(1.0, 0.0, 0.5);
        assert_relative_eq!(out, 1.0, epsilon = 1e-6);
    }
}
