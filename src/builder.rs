//! Builder for configuring and constructing a `SpatialAudioController`.

use crate::clock::{Clock, MonotonicClock};
use crate::config::{BeaconSource, ControllerConfig};
use crate::{Result, SpatialAudioController};
use marble_core::{AudioBackend, SessionConfig};
use std::path::PathBuf;

/// Without an explicit backend the builder opens the default CPAL output
/// device (feature `"cpal"`, on by default). Headless builds must pass one.
///
/// Nothing touches the audio device until
/// [`start`](SpatialAudioController::start).
///
/// # Example
///
/// ```ignore
/// use marble::prelude::*;
///
/// let (backend, handle) = OfflineBackend::new(48_000.0);
/// let mut controller = SpatialAudioController::builder()
///     .backend(backend)
///     .asset_root("assets/sounds")
///     .beacon(BeaconSource::Tone { freq: 440.0, gain: 0.18 })
///     .build()?;
///
/// controller.start()?;
/// let block = handle.render(512);
/// ```
#[derive(Default)]
pub struct SpatialAudioControllerBuilder {
    config: ControllerConfig,
    backend: Option<Box<dyn AudioBackend>>,
    clock: Option<Box<dyn Clock>>,
}

impl SpatialAudioControllerBuilder {
    /// Replace the whole configuration. Later builder calls still apply on top.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(mut self, backend: impl AudioBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Time source for cooldowns and event timestamps. Default: wall clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    pub fn output_device(mut self, index: usize) -> Self {
        self.config.session.device_index = Some(index);
        self
    }

    /// Directory holding `roll_loop.wav`, `pling.wav` and `whoosh.wav`.
    pub fn asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.asset_root = Some(root.into());
        self
    }

    pub fn beacon(mut self, beacon: BeaconSource) -> Self {
        self.config.beacon = beacon;
        self
    }

    /// Default: 2.0
    pub fn meters_per_screen(mut self, meters: f32) -> Self {
        self.config.meters_per_screen = meters;
        self
    }

    pub fn build(self) -> Result<SpatialAudioController> {
        let backend = match self.backend {
            Some(backend) => backend,
            None => default_backend()?,
        };
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(MonotonicClock::new()));
        SpatialAudioController::from_parts(self.config, backend, clock)
    }
}

#[cfg(feature = "cpal")]
fn default_backend() -> Result<Box<dyn AudioBackend>> {
    Ok(Box::new(marble_core::CpalBackend::new()))
}

#[cfg(not(feature = "cpal"))]
fn default_backend() -> Result<Box<dyn AudioBackend>> {
    Err(crate::Error::AudioUnavailable(
        "no audio backend; enable the \"cpal\" feature or pass one to the builder".into(),
    ))
}
