//! Error types for levelog

use std::io;

use thiserror::Error;

/// Errors returned by the fallible parts of the crate
#[derive(Debug, Error)]
pub enum LogError {
    /// A level string did not match any known literal
    #[error("invalid log level: {0:?}")]
    InvalidLevel(String),

    /// A flag name in configuration did not match any known flag
    #[error("unknown format flag: {0:?}")]
    UnknownFlag(String),

    /// Underlying sink or file failure
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The remote collector could not be reached
    #[error("failed to connect to collector at {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A forwarded record could not be encoded
    #[error("failed to encode record")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LogError>;
