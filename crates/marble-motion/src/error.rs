//! Error types for the motion subsystem.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Motion source already has a subscriber")]
    AlreadySubscribed,
}

pub type Result<T> = std::result::Result<T, Error>;
