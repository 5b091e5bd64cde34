//! Audio session configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How demanding a session request is.
///
/// `Spatial` asks for a specific rate, channel count and buffer size.
/// `Minimal` accepts whatever the device defaults to and is the one-shot
/// fallback when a spatial request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionProfile {
    #[default]
    Spatial,
    Minimal,
}

/// Configuration for acquiring an audio output session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub profile: SessionProfile,
    /// `None` = device default.
    pub sample_rate: Option<u32>,
    pub channels: u16,
    /// `None` = device default.
    pub buffer_frames: Option<u32>,
    /// `None` = system default output.
    pub device_index: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: SessionProfile::Spatial,
            sample_rate: Some(48_000),
            channels: 2,
            buffer_frames: Some(512),
            device_index: None,
        }
    }
}

impl SessionConfig {
    /// Bare-minimum request: default device, default format.
    pub fn minimal() -> Self {
        Self {
            profile: SessionProfile::Minimal,
            sample_rate: None,
            channels: 2,
            buffer_frames: None,
            device_index: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.sample_rate {
            if !(8_000..=384_000).contains(&rate) {
                return Err(Error::InvalidConfig(format!(
                    "sample_rate {} out of range (8000-384000 Hz)",
                    rate
                )));
            }
        }
        if self.channels == 0 || self.channels > 32 {
            return Err(Error::InvalidConfig(format!(
                "channels {} out of range (1-32)",
                self.channels
            )));
        }
        if let Some(frames) = self.buffer_frames {
            if !(16..=8192).contains(&frames) {
                return Err(Error::InvalidConfig(format!(
                    "buffer_frames {} out of range (16-8192)",
                    frames
                )));
            }
        }
        Ok(())
    }
}
