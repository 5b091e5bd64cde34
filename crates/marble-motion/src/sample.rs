//! Head-motion sample.

use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// Euler attitude in radians.
///
/// `yaw` is `None` on providers that only report tilt; it reads as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: Option<f64>,
}

impl Attitude {
    pub fn yaw_or_zero(&self) -> f64 {
        self.yaw.unwrap_or(0.0)
    }
}

/// One reading from a head-motion sensor.
///
/// Produced at sensor cadence (typically 50-100 Hz) by the motion source and
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Seconds on the source's clock.
    pub timestamp: f64,
    pub attitude: Attitude,
    /// Unit-norm orientation.
    pub quaternion: DQuat,
    /// rad/s
    pub rotation_rate: DVec3,
    /// In g, gravity removed.
    pub user_acceleration: DVec3,
    /// In g. Unit length when the head is still.
    pub gravity: DVec3,
    pub connected: bool,
}

impl Default for MotionSample {
    fn default() -> Self {
        Self {
            timestamp: 0.0,
            attitude: Attitude::default(),
            quaternion: DQuat::IDENTITY,
            rotation_rate: DVec3::ZERO,
            user_acceleration: DVec3::ZERO,
            gravity: DVec3::NEG_Y,
            connected: false,
        }
    }
}

impl MotionSample {
    /// Build a connected sample from Euler angles, deriving the quaternion and
    /// the gravity vector in the head frame.
    pub fn from_attitude(timestamp: f64, roll: f64, pitch: f64, yaw: Option<f64>) -> Self {
        let quaternion =
            DQuat::from_euler(EulerRot::YXZ, yaw.unwrap_or(0.0), pitch, -roll).normalize();
        Self {
            timestamp,
            attitude: Attitude { roll, pitch, yaw },
            quaternion,
            gravity: quaternion.inverse() * DVec3::NEG_Y,
            connected: true,
            ..Self::default()
        }
    }

    pub fn with_rotation_rate(mut self, rate: DVec3) -> Self {
        self.rotation_rate = rate;
        self
    }

    pub fn with_user_acceleration(mut self, accel: DVec3) -> Self {
        self.user_acceleration = accel;
        self
    }

    /// Whether every reading is a finite number. A missing yaw counts as finite.
    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite()
            && self.attitude.roll.is_finite()
            && self.attitude.pitch.is_finite()
            && self.attitude.yaw.map_or(true, f64::is_finite)
            && self.quaternion.is_finite()
            && self.rotation_rate.is_finite()
            && self.user_acceleration.is_finite()
            && self.gravity.is_finite()
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }
}
