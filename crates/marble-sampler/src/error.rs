//! Error types.

use thiserror::Error;

/// Asset and buffer errors.
///
/// None of these are fatal to playback: callers log them and leave the
/// affected voice silent.
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be read for a reason other than being absent.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Asset not found: {0}")]
    AssetMissing(String),

    /// Decoding or format conversion failed.
    #[error("Failed to convert '{name}': {reason}")]
    Conversion { name: String, reason: String },

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
