//! Error types for marble-dsp

use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    InvalidChannelCount(String),
    InvalidParameter(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidChannelCount(msg) => write!(f, "Invalid channel count: {}", msg),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
