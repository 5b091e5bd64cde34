//! Test helpers and fixtures for marble integration tests
//!
//! Every controller here runs on the offline backend with a manual clock, so
//! rendering and cooldowns are fully deterministic.

#![allow(dead_code)]

pub mod tolerances;

use hound::{SampleFormat, WavSpec, WavWriter};
use marble::prelude::*;
use marble::{ManualClock, OfflineHandle};
use std::path::Path;
use tempfile::TempDir;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard block size for deterministic rendering
pub const TEST_BLOCK: usize = 512;

/// A controller wired to an offline backend.
pub struct Harness {
    pub controller: SpatialAudioController,
    pub handle: OfflineHandle,
    pub clock: ManualClock,
    /// Keeps the asset directory alive for the test.
    pub assets: Option<TempDir>,
}

impl Harness {
    /// Render `frames` and return `(left, right)`.
    pub fn render_stereo(&self, frames: usize) -> (Vec<f32>, Vec<f32>) {
        let block = self.handle.render(frames).expect("session is not active");
        split_stereo(&block)
    }

    /// Render and discard, e.g. to let smoothers settle.
    pub fn settle(&self, frames: usize) {
        let _ = self.handle.render(frames);
    }
}

/// Route controller logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn harness_with(config: ControllerConfig) -> Harness {
    init_tracing();
    let (backend, handle) = OfflineBackend::new(TEST_SAMPLE_RATE);
    let clock = ManualClock::new();
    let controller = SpatialAudioController::builder()
        .config(config)
        .backend(backend)
        .clock(clock.clone())
        .build()
        .expect("Failed to create test controller");
    Harness {
        controller,
        handle,
        clock,
        assets: None,
    }
}

/// Controller with default config and no bundled sounds.
pub fn test_harness() -> Harness {
    harness_with(ControllerConfig::default())
}

/// Controller with all three bundled sounds on disk.
pub fn harness_with_assets(mut config: ControllerConfig) -> Harness {
    let dir = asset_dir();
    config.asset_root = Some(dir.path().to_path_buf());
    let mut harness = harness_with(config);
    harness.assets = Some(dir);
    harness
}

/// Started controller; panics if start fails.
pub fn running_harness() -> Harness {
    let mut harness = test_harness();
    harness.controller.start().expect("start failed");
    harness
}

/// Temp directory with `roll_loop`, `pling` and `whoosh` test tones.
///
/// The roll loop is written at 24 kHz so loading exercises resampling.
pub fn asset_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_tone_wav(dir.path(), "roll_loop", 2_000.0, 1.0, 24_000);
    write_tone_wav(dir.path(), "pling", 3_000.0, 0.5, 48_000);
    write_tone_wav(dir.path(), "whoosh", 4_000.0, 0.5, 48_000);
    dir
}

/// Write a 16-bit mono sine at half scale.
pub fn write_tone_wav(dir: &Path, name: &str, freq: f64, seconds: f64, sample_rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let path = dir.join(format!("{name}.wav"));
    let mut writer = WavWriter::create(path, spec).expect("Failed to create WAV");
    let frames = (seconds * sample_rate as f64) as usize;
    for n in 0..frames {
        let t = n as f64 / sample_rate as f64;
        let s = (2.0 * std::f64::consts::PI * freq * t).sin() * 0.5;
        writer
            .write_sample((s * i16::MAX as f64) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

/// Deinterleave a stereo block.
pub fn split_stereo(block: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let left = block.iter().step_by(2).copied().collect();
    let right = block.iter().skip(1).step_by(2).copied().collect();
    (left, right)
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}
