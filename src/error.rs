//! Error types for key generation and activation.

use thiserror::Error;

/// Errors raised at the boundary of the key generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeygenError {
    /// No device id was supplied.
    #[error("no device id supplied")]
    MissingArgument,

    /// The normalized device id is too short.
    #[error("Device ID should be at least {min} characters")]
    InvalidDeviceId { id: String, min: usize },

    /// An activation code could not be parsed into a license key.
    #[error("invalid license key format: {0}")]
    InvalidKeyFormat(String),
}

/// Result type for key generator operations.
pub type Result<T> = std::result::Result<T, KeygenError>;
