//! Centralized error type for the marble umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] marble_core::Error),

    #[error("Motion: {0}")]
    Motion(#[from] marble_motion::Error),

    #[error("Sampler: {0}")]
    Sampler(#[from] marble_sampler::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] marble_dsp::Error),

    /// No session could be acquired, even with the minimal profile.
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
