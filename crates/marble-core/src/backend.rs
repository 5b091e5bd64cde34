//! Audio backend seam.
//!
//! A backend turns a [`SessionConfig`] into a running output stream that
//! pulls frames from an [`AudioRenderer`]. Configuration and activation are
//! separate steps so the renderer can be built for the sample rate the device
//! actually granted.

use crate::config::{SessionConfig, SessionProfile};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Format granted by a backend after configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub channels: usize,
    pub profile: SessionProfile,
}

/// Pulled by the backend's render thread.
pub trait AudioRenderer: Send + 'static {
    /// Fill interleaved `output` with `channels` samples per frame.
    fn render(&mut self, output: &mut [f32], channels: usize);
}

/// Output device abstraction.
pub trait AudioBackend: Send {
    fn name(&self) -> &str;

    /// Negotiate a format. Rejections are reported as [`Error::Configuration`].
    fn configure(&mut self, config: &SessionConfig) -> Result<StreamFormat>;

    /// Start pulling audio from `renderer`. Requires a prior `configure`.
    fn activate(&mut self, renderer: Box<dyn AudioRenderer>) -> Result<()>;

    /// Stop the stream and release the device. Safe to call repeatedly.
    fn deactivate(&mut self);

    fn is_active(&self) -> bool;
}

type RendererSlot = Arc<Mutex<Option<Box<dyn AudioRenderer>>>>;

/// Headless backend that renders on demand.
///
/// Nothing runs on its own; the paired [`OfflineHandle`] pulls frames. Used
/// for tests and for hosts that drive rendering themselves.
pub struct OfflineBackend {
    default_rate: f64,
    reject_remaining: usize,
    reject_all: bool,
    format: Arc<Mutex<Option<StreamFormat>>>,
    slot: RendererSlot,
    attempts: Arc<AtomicUsize>,
}

impl OfflineBackend {
    pub fn new(default_rate: f64) -> (Self, OfflineHandle) {
        let format = Arc::new(Mutex::new(None));
        let slot: RendererSlot = Arc::new(Mutex::new(None));
        let attempts = Arc::new(AtomicUsize::new(0));

        let handle = OfflineHandle {
            format: Arc::clone(&format),
            slot: Arc::clone(&slot),
            attempts: Arc::clone(&attempts),
        };

        (
            Self {
                default_rate,
                reject_remaining: 0,
                reject_all: false,
                format,
                slot,
                attempts,
            },
            handle,
        )
    }

    /// Reject the next `count` configure calls, like a device refusing a
    /// category/mode combination.
    pub fn reject_first(mut self, count: usize) -> Self {
        self.reject_remaining = count;
        self
    }

    /// Reject every configure call.
    pub fn reject_always(mut self) -> Self {
        self.reject_all = true;
        self
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn configure(&mut self, config: &SessionConfig) -> Result<StreamFormat> {
        self.attempts.fetch_add(1, Ordering::AcqRel);

        if self.reject_all || self.reject_remaining > 0 {
            self.reject_remaining = self.reject_remaining.saturating_sub(1);
            return Err(Error::Configuration(format!(
                "offline backend rejected {:?} profile",
                config.profile
            )));
        }

        let sample_rate = match config.profile {
            SessionProfile::Spatial => config
                .sample_rate
                .map(f64::from)
                .unwrap_or(self.default_rate),
            SessionProfile::Minimal => self.default_rate,
        };
        let format = StreamFormat {
            sample_rate,
            channels: usize::from(config.channels.max(1)),
            profile: config.profile,
        };
        *self.format.lock() = Some(format);
        Ok(format)
    }

    fn activate(&mut self, renderer: Box<dyn AudioRenderer>) -> Result<()> {
        if self.format.lock().is_none() {
            return Err(Error::NotConfigured);
        }
        *self.slot.lock() = Some(renderer);
        Ok(())
    }

    fn deactivate(&mut self) {
        self.slot.lock().take();
        self.format.lock().take();
    }

    fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }
}

/// Pulls audio out of an [`OfflineBackend`].
#[derive(Clone)]
pub struct OfflineHandle {
    format: Arc<Mutex<Option<StreamFormat>>>,
    slot: RendererSlot,
    attempts: Arc<AtomicUsize>,
}

impl OfflineHandle {
    /// Render `frames` interleaved frames, or `None` while inactive.
    pub fn render(&self, frames: usize) -> Option<Vec<f32>> {
        let channels = self.format()?.channels;
        let mut slot = self.slot.lock();
        let renderer = slot.as_mut()?;
        let mut block = vec![0.0; frames * channels];
        renderer.render(&mut block, channels);
        Some(block)
    }

    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn format(&self) -> Option<StreamFormat> {
        *self.format.lock()
    }

    /// Total configure calls seen, including rejected ones.
    pub fn configure_attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }
}
