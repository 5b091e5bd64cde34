//! Controller configuration.

use crate::curves::{ImpactCurve, VelocityCurves, WhooshPolicy};
use crate::{Error, Result};
use marble_core::SessionConfig;
use marble_dsp::EnvironmentConfig;
use marble_motion::{MappingConfig, OrbitConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File stems of the bundled sounds, resolved against `asset_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetNames {
    pub roll_loop: String,
    pub impact: String,
    pub whoosh: String,
}

impl Default for AssetNames {
    fn default() -> Self {
        Self {
            roll_loop: "roll_loop".to_string(),
            impact: "pling".to_string(),
            whoosh: "whoosh".to_string(),
        }
    }
}

/// What the beacon voice loops after `start()`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeaconSource {
    /// Nothing until one of the `play_*` calls.
    #[default]
    Silent,
    Tone { freq: f64, gain: f32 },
    Noise { gain: f32, am_hz: f64 },
    /// Looped asset, by name.
    Asset { name: String },
}

/// Everything [`SpatialAudioController`](crate::SpatialAudioController)
/// needs. Every field has a working default.
///
/// ```rust,ignore
/// let config = ControllerConfig {
///     asset_root: Some("assets/sounds".into()),
///     beacon: BeaconSource::Tone { freq: 440.0, gain: 0.18 },
///     ..Default::default()
/// };
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub session: SessionConfig,
    pub environment: EnvironmentConfig,
    pub mapping: MappingConfig,
    pub orbit: OrbitConfig,

    pub curves: VelocityCurves,
    pub impact: ImpactCurve,
    pub whoosh: WhooshPolicy,

    /// Width of the screen in meters when mapping screen points to positions.
    pub meters_per_screen: f32,

    pub assets: AssetNames,
    /// `None` = no bundled sounds; those voices stay silent.
    pub asset_root: Option<PathBuf>,

    pub beacon: BeaconSource,
    pub beacon_volume: f32,

    pub master_gain: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            environment: EnvironmentConfig::default(),
            mapping: MappingConfig::default(),
            orbit: OrbitConfig::default(),
            curves: VelocityCurves::default(),
            impact: ImpactCurve::default(),
            whoosh: WhooshPolicy::default(),
            meters_per_screen: 2.0,
            assets: AssetNames::default(),
            asset_root: None,
            beacon: BeaconSource::Silent,
            beacon_volume: 0.2,
            master_gain: 1.0,
        }
    }
}

/// Highest tone accepted before the session rate is known.
const MAX_TONE_HZ: f64 = 20_000.0;

/// Tone frequency playable at `sample_rate`.
pub(crate) fn tone_in_range(freq: f64, sample_rate: f64) -> bool {
    freq > 0.0 && freq < MAX_TONE_HZ && freq < sample_rate * 0.5
}

/// Generated beacon content stays within full scale.
pub(crate) fn beacon_gain_in_range(gain: f32) -> bool {
    (0.0..=1.0).contains(&gain)
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.environment.validate()?;
        self.mapping.validate()?;
        self.orbit.validate()?;
        self.curves.validate()?;
        self.impact.validate()?;
        self.whoosh.validate()?;

        if !(self.meters_per_screen > 0.0 && self.meters_per_screen.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "meters_per_screen {} must be positive",
                self.meters_per_screen
            )));
        }
        if !(0.0..=4.0).contains(&self.beacon_volume) {
            return Err(Error::InvalidConfig(format!(
                "beacon_volume {} out of range (0-4)",
                self.beacon_volume
            )));
        }
        if !(0.0..=4.0).contains(&self.master_gain) {
            return Err(Error::InvalidConfig(format!(
                "master_gain {} out of range (0-4)",
                self.master_gain
            )));
        }
        match &self.beacon {
            BeaconSource::Tone { freq, .. } if !tone_in_range(*freq, f64::INFINITY) => {
                Err(Error::InvalidConfig(format!("beacon tone {freq} Hz out of range")))
            }
            BeaconSource::Tone { gain, .. } | BeaconSource::Noise { gain, .. }
                if !beacon_gain_in_range(*gain) =>
            {
                Err(Error::InvalidConfig(format!(
                    "beacon gain {gain} out of range (0-1)"
                )))
            }
            BeaconSource::Noise { am_hz, .. } if !(*am_hz >= 0.0 && am_hz.is_finite()) => Err(
                Error::InvalidConfig(format!("beacon noise AM rate {am_hz} Hz out of range")),
            ),
            BeaconSource::Asset { name } if name.is_empty() => {
                Err(Error::InvalidConfig("beacon asset name is empty".into()))
            }
            _ => Ok(()),
        }
    }
}
