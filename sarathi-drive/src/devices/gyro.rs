//! Simulated gyro with bias and noise.

use rand::Rng;

use chakra_swerve::core::math::normalize_angle;
use chakra_swerve::hardware::Imu;

use crate::config::SimConfig;

/// Yaw source integrating the true chassis rate with a constant bias
/// and uniform read noise.
///
/// The estimator consumes yaw deltas, so the slow bias drift shows up
/// as heading error that only a vision correction can remove — the
/// same failure mode a real MEMS gyro exhibits.
#[derive(Debug, Clone)]
pub struct SimGyro {
    bias_rad_s: f32,
    noise_rad: f32,
    true_yaw_rad: f32,
    reading_rad: f32,
    rate_rad_s: f32,
}

impl SimGyro {
    /// Create a gyro at zero yaw.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            bias_rad_s: config.gyro_bias_rad_s,
            noise_rad: config.gyro_noise_rad,
            true_yaw_rad: 0.0,
            reading_rad: 0.0,
            rate_rad_s: 0.0,
        }
    }

    /// Integrate the true chassis yaw rate over `dt` seconds.
    pub fn step(&mut self, true_rate_rad_s: f32, dt: f32) {
        self.rate_rad_s = true_rate_rad_s + self.bias_rad_s;
        self.true_yaw_rad = normalize_angle(self.true_yaw_rad + self.rate_rad_s * dt);
        let noise = if self.noise_rad > 0.0 {
            rand::thread_rng().gen_range(-self.noise_rad..self.noise_rad)
        } else {
            0.0
        };
        self.reading_rad = normalize_angle(self.true_yaw_rad + noise);
    }
}

impl Imu for SimGyro {
    fn yaw(&self) -> f32 {
        self.reading_rad
    }

    fn yaw_rate(&self) -> f32 {
        self.rate_rad_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quiet_config() -> SimConfig {
        SimConfig {
            gyro_bias_rad_s: 0.0,
            gyro_noise_rad: 0.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_integrates_rate() {
        let mut gyro = SimGyro::new(&quiet_config());
        for _ in 0..50 {
            gyro.step(1.0, 0.02);
        }
        assert_relative_eq!(gyro.yaw(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(gyro.yaw_rate(), 1.0);
    }

    #[test]
    fn test_bias_accumulates() {
        let config = SimConfig {
            gyro_bias_rad_s: 0.01,
            gyro_noise_rad: 0.0,
            ..SimConfig::default()
        };
        let mut gyro = SimGyro::new(&config);
        for _ in 0..500 {
            gyro.step(0.0, 0.02);
        }
        // 10 s of 0.01 rad/s bias
        assert_relative_eq!(gyro.yaw(), 0.1, epsilon = 1e-3);
    }

    #[test]
    fn test_noise_stays_bounded() {
        let config = SimConfig {
            gyro_bias_rad_s: 0.0,
            gyro_noise_rad: 0.005,
            ..SimConfig::default()
        };
        let mut gyro = SimGyro::new(&config);
        for _ in 0..100 {
            gyro.step(0.0, 0.02);
            assert!(gyro.yaw().abs() <= 0.005 + 1e-6);
        }
    }
}
