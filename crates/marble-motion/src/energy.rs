//! Movement energy: a normalized [0, 1] drive signal.
//!
//! Two producers exist. A physics layer reports the speed of the object it
//! simulates and normalizes it with [`MovementEnergy::from_speed`]; without
//! one, [`EnergyEstimator`] derives a proxy from the head sensor's angular
//! rate and linear acceleration.

use crate::sample::MotionSample;
use glam::DVec2;

/// Reference top speed of the physics layer, in scene units per second.
pub const DEFAULT_MAX_SPEED: f64 = 1200.0;

/// Scalar in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MovementEnergy(f64);

impl MovementEnergy {
    pub const ZERO: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    /// Clamps into [0, 1]; NaN reads as 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// `min(speed / max_speed, 1)`.
    pub fn from_speed(speed: f64, max_speed: f64) -> Self {
        if max_speed <= 0.0 {
            return Self::ZERO;
        }
        Self::new(speed.abs() / max_speed)
    }

    /// Speed of a 2D velocity against [`DEFAULT_MAX_SPEED`].
    pub fn from_velocity(velocity: DVec2) -> Self {
        Self::from_speed(velocity.length(), DEFAULT_MAX_SPEED)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<MovementEnergy> for f64 {
    fn from(energy: MovementEnergy) -> Self {
        energy.0
    }
}

/// Sensor-driven energy proxy.
///
/// Raw energy is `|ω| / reference_rate + accel_weight · |a|`, clamped, then
/// smoothed with a one-pole filter whose time constant is `tau` seconds.
/// Sample timestamps set the filter step, so irregular cadence is handled.
#[derive(Debug, Clone)]
pub struct EnergyEstimator {
    reference_rate: f64,
    accel_weight: f64,
    tau: f64,
    value: f64,
    last_timestamp: Option<f64>,
}

impl EnergyEstimator {
    pub fn new(reference_rate: f64, accel_weight: f64, tau: f64) -> Self {
        Self {
            reference_rate: reference_rate.max(f64::EPSILON),
            accel_weight: accel_weight.max(0.0),
            tau: tau.max(0.0),
            value: 0.0,
            last_timestamp: None,
        }
    }

    pub fn update(&mut self, sample: &MotionSample) -> MovementEnergy {
        if !sample.connected {
            return self.energy();
        }

        let raw = (sample.rotation_rate.length() / self.reference_rate
            + self.accel_weight * sample.user_acceleration.length())
        .clamp(0.0, 1.0);

        let alpha = match self.last_timestamp {
            // First reading seeds the filter.
            None => 1.0,
            Some(_) if self.tau == 0.0 => 1.0,
            Some(prev) => 1.0 - (-(sample.timestamp - prev).max(0.0) / self.tau).exp(),
        };
        self.last_timestamp = Some(sample.timestamp);

        self.value += alpha * (raw - self.value);
        self.energy()
    }

    pub fn energy(&self) -> MovementEnergy {
        MovementEnergy::new(self.value)
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.last_timestamp = None;
    }
}

impl Default for EnergyEstimator {
    fn default() -> Self {
        Self::new(6.0, 0.5, 0.15)
    }
}

/// Gravity for a 2D physics scene from head tilt: `(sin(roll)·k, −sin(pitch)·k)`.
pub fn gravity_from_tilt(roll: f64, pitch: f64, k: f64) -> DVec2 {
    DVec2::new(roll.sin() * k, -pitch.sin() * k)
}
