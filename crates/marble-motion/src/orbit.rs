//! Synthetic circular sweep around the listener.

use crate::mapper::{SourcePose, DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};
use crate::{Error, Result};
use core::f64::consts::TAU;
use serde::{Deserialize, Serialize};

/// Sweep speed and direction. The radius is the pose mapping's, so live and
/// orbit modes place the source on the same circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Revolutions per minute, 0.5-30.
    pub rpm: f64,
    pub clockwise: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rpm: 6.0,
            clockwise: true,
        }
    }
}

impl OrbitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.5..=30.0).contains(&self.rpm) {
            return Err(Error::InvalidConfig(format!(
                "rpm {} out of range (0.5-30)",
                self.rpm
            )));
        }
        Ok(())
    }

    /// rad/s, signed: clockwise is negative.
    pub fn angular_velocity(&self) -> f64 {
        let omega = self.rpm * TAU / 60.0;
        if self.clockwise {
            -omega
        } else {
            omega
        }
    }
}

/// Moves a source around the listener at a fixed radius.
///
/// Angle 0 is straight ahead (−Z); the angle is kept in [0, 2π) while the
/// unwrapped total is tracked separately.
#[derive(Debug, Clone)]
pub struct OrbitGenerator {
    config: OrbitConfig,
    radius: f64,
    angle: f64,
    unwrapped: f64,
}

impl OrbitGenerator {
    /// `radius` in meters, 0.5-3.0; normally the mapping radius.
    pub fn new(config: OrbitConfig, radius: f64) -> Result<Self> {
        config.validate()?;
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
            return Err(Error::InvalidConfig(format!(
                "radius {radius} out of range ({MIN_RADIUS}-{MAX_RADIUS} m)"
            )));
        }
        Ok(Self {
            config,
            radius,
            angle: 0.0,
            unwrapped: 0.0,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn set_rpm(&mut self, rpm: f64) -> Result<()> {
        let config = OrbitConfig {
            rpm,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_clockwise(&mut self, clockwise: bool) {
        self.config.clockwise = clockwise;
    }

    /// Wrapped angle in [0, 2π).
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Total signed rotation since creation or the last reset.
    pub fn unwrapped_angle(&self) -> f64 {
        self.unwrapped
    }

    pub fn reset(&mut self) {
        self.angle = 0.0;
        self.unwrapped = 0.0;
    }

    /// Advance by `dt` seconds and return the new source pose.
    pub fn advance(&mut self, dt: f64) -> SourcePose {
        let step = self.config.angular_velocity() * dt.max(0.0);
        self.unwrapped += step;
        self.angle = (self.angle + step).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if self.angle >= TAU {
            self.angle = 0.0;
        }
        self.pose()
    }

    /// Pose at the current angle.
    pub fn pose(&self) -> SourcePose {
        let r = self.radius;
        SourcePose::new(
            (r * self.angle.sin()) as f32,
            0.0,
            (-r * self.angle.cos()) as f32,
        )
    }
}

impl Default for OrbitGenerator {
    fn default() -> Self {
        Self {
            config: OrbitConfig::default(),
            radius: DEFAULT_RADIUS,
            angle: 0.0,
            unwrapped: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn orbit(rpm: f64, clockwise: bool) -> OrbitGenerator {
        OrbitGenerator::new(OrbitConfig { rpm, clockwise }, 1.0).unwrap()
    }

    #[test]
    fn test_starts_in_front() {
        let pose = orbit(6.0, true).pose();
        assert_abs_diff_eq!(pose.position.z, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.position.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_counter_clockwise_quarter_turn_goes_right() {
        // 15 rpm = one quarter turn per second
        let mut gen = orbit(15.0, false);
        let pose = gen.advance(1.0);
        assert_abs_diff_eq!(pose.position.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(pose.position.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_wraps_past_full_turn() {
        let mut gen = orbit(30.0, false);
        for _ in 0..150 {
            gen.advance(1.0 / 60.0);
        }
        // 2.5 s at 0.5 rev/s = 1.25 rev
        assert!(gen.angle() < TAU);
        assert_abs_diff_eq!(gen.unwrapped_angle(), 1.25 * TAU, epsilon = 1e-9);
        assert_abs_diff_eq!(gen.angle(), 0.25 * TAU, epsilon = 1e-9);
    }

    #[test]
    fn test_radius_validation() {
        assert!(OrbitGenerator::new(OrbitConfig::default(), 0.2).is_err());
        assert!(OrbitGenerator::new(OrbitConfig::default(), f64::NAN).is_err());
        let gen = OrbitGenerator::new(OrbitConfig::default(), 2.5).unwrap();
        assert_abs_diff_eq!(gen.pose().position.length(), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_rpm_validation() {
        let mut gen = orbit(6.0, true);
        assert!(gen.set_rpm(0.1).is_err());
        assert!(gen.set_rpm(31.0).is_err());
        assert!(gen.set_rpm(12.0).is_ok());
        assert_eq!(gen.config().rpm, 12.0);
    }

    proptest! {
        #[test]
        fn prop_wrapped_angle_congruent(
            rpm in 0.5f64..=30.0,
            clockwise in any::<bool>(),
            steps in 1usize..400,
        ) {
            let mut gen = orbit(rpm, clockwise);
            for _ in 0..steps {
                gen.advance(1.0 / 60.0);
            }
            let angle = gen.angle();
            prop_assert!((0.0..TAU).contains(&angle));

            let diff = (gen.unwrapped_angle() - angle) / TAU;
            prop_assert!((diff - diff.round()).abs() < 1e-9);
        }

        #[test]
        fn prop_directions_mirror(rpm in 0.5f64..=30.0, steps in 1usize..400) {
            let mut cw = orbit(rpm, true);
            let mut ccw = orbit(rpm, false);
            for _ in 0..steps {
                let a = cw.advance(1.0 / 60.0).position;
                let b = ccw.advance(1.0 / 60.0).position;
                prop_assert!((a.x + b.x).abs() < 1e-4);
                prop_assert!((a.z - b.z).abs() < 1e-4);
            }
        }
    }
}
