//! Sample → pose mapping for live head-tilt mode.
//!
//! Head tilt picks a direction on the horizontal plane: roll moves the source
//! left/right, pitch moves it front/back. The direction is normalized and
//! scaled to a fixed radius, so the source always sits on a circle around the
//! listener and only its bearing follows the head.

use crate::sample::MotionSample;
use crate::{Error, Result};
use glam::{DVec3, Vec3};
use marble_core::ListenerOrientation;
use serde::{Deserialize, Serialize};

pub const MIN_RADIUS: f64 = 0.5;
pub const MAX_RADIUS: f64 = 3.0;
pub const DEFAULT_RADIUS: f64 = 1.8;

/// Which sample axes rotate the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerAxes {
    /// Yaw only. Keeps front/back cues clear while tilt moves the source.
    #[default]
    YawOnly,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Positive pitch maps to the front (−Z) when set.
    pub invert_front_back: bool,
    pub invert_left_right: bool,
    /// Meters, 0.5-3.0.
    pub radius: f64,
    pub listener_axes: ListenerAxes,
    /// Minimum direction magnitude before normalizing.
    pub epsilon: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            invert_front_back: true,
            invert_left_right: false,
            radius: DEFAULT_RADIUS,
            listener_axes: ListenerAxes::YawOnly,
            epsilon: 0.001,
        }
    }
}

impl MappingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&self.radius) {
            return Err(Error::InvalidConfig(format!(
                "radius {} out of range ({MIN_RADIUS}-{MAX_RADIUS} m)",
                self.radius
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Listener orientation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ListenerPose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl ListenerPose {
    /// Facing straight ahead.
    pub const FORWARD: Self = Self {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    pub fn orientation(&self) -> ListenerOrientation {
        ListenerOrientation::new(self.yaw as f32, self.pitch as f32, self.roll as f32)
    }

    /// (yaw, pitch, roll) in degrees, for backends that want them.
    pub fn to_degrees(&self) -> (f64, f64, f64) {
        (
            self.yaw.to_degrees(),
            self.pitch.to_degrees(),
            self.roll.to_degrees(),
        )
    }
}

/// Source position in meters relative to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourcePose {
    pub position: Vec3,
}

impl SourcePose {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
        }
    }
}

/// Listener and source poses derived from one sample or orbit step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseUpdate {
    pub listener: ListenerPose,
    pub source: SourcePose,
}

impl PoseUpdate {
    pub fn is_finite(&self) -> bool {
        self.listener.is_finite() && self.source.position.is_finite()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PoseMapper {
    config: MappingConfig,
}

impl PoseMapper {
    pub fn new(config: MappingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn listener(&self, sample: &MotionSample) -> ListenerPose {
        let yaw = sample.attitude.yaw_or_zero();
        match self.config.listener_axes {
            ListenerAxes::YawOnly => ListenerPose {
                yaw,
                ..ListenerPose::FORWARD
            },
            ListenerAxes::Full => ListenerPose {
                yaw,
                pitch: sample.attitude.pitch,
                roll: sample.attitude.roll,
            },
        }
    }

    /// Horizontal bearing from head tilt.
    ///
    /// Unit length for any tilt larger than `epsilon`; shorter (down to the
    /// zero vector) inside it. Never NaN for finite input.
    pub fn direction(&self, sample: &MotionSample) -> DVec3 {
        let mut dx = sample.attitude.roll;
        let mut dz = sample.attitude.pitch;
        if self.config.invert_left_right {
            dx = -dx;
        }
        if self.config.invert_front_back {
            dz = -dz;
        }

        let len = dx.hypot(dz).max(self.config.epsilon);
        DVec3::new(dx / len, 0.0, dz / len)
    }

    pub fn source(&self, sample: &MotionSample) -> SourcePose {
        SourcePose {
            position: (self.direction(sample) * self.config.radius).as_vec3(),
        }
    }

    pub fn map(&self, sample: &MotionSample) -> PoseUpdate {
        PoseUpdate {
            listener: self.listener(sample),
            source: self.source(sample),
        }
    }
}
