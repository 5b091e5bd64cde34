//! Error types for marble-core.

use thiserror::Error;

/// Error type for marble-core operations.
///
/// [`Error::Configuration`] is only produced while a session is being
/// configured, so callers can tell "the device refused this setup" apart from
/// a stream that failed after it was running ([`Error::Stream`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Session configuration rejected: {0}")]
    Configuration(String),

    #[error("Audio stream failure: {0}")]
    Stream(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Session is not configured")]
    NotConfigured,

    #[cfg(feature = "cpal")]
    #[error("Failed to enumerate devices")]
    Devices(#[from] cpal::DevicesError),

    #[cfg(feature = "cpal")]
    #[error("Failed to get device name")]
    DeviceName(#[from] cpal::DeviceNameError),
}

impl Error {
    /// True when the backend rejected the requested session setup.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
