//! Error types for the accessibility core

use thiserror::Error;

/// Result type alias for accessibility operations
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors raised by internal plumbing.
///
/// Public Speak/Play/Stop/Update operations never surface these; they log and no-op.
/// Constructors and config loading return them so the composer can decide how to degrade.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Clip not loaded: {0}")]
    ClipNotFound(String),

    #[error("Clip load failed for {name}: {reason}")]
    ClipLoad { name: String, reason: String },

    #[error("Audio playback error: {0}")]
    Playback(String),

    #[error("Speech output error: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AccessError {
    fn from(err: config::ConfigError) -> Self {
        AccessError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for AccessError {
    fn from(err: toml::de::Error) -> Self {
        AccessError::Config(err.to_string())
    }
}

impl From<rodio::StreamError> for AccessError {
    fn from(err: rodio::StreamError) -> Self {
        AccessError::Playback(err.to_string())
    }
}

impl From<rodio::PlayError> for AccessError {
    fn from(err: rodio::PlayError) -> Self {
        AccessError::Playback(err.to_string())
    }
}

impl From<rodio::decoder::DecoderError> for AccessError {
    fn from(err: rodio::decoder::DecoderError) -> Self {
        AccessError::Playback(format!("Decode failed: {}", err))
    }
}
