//! Error types for the repitch crate.

use thiserror::Error;

/// Errors that can occur while processing or loading waveforms.
#[derive(Error, Debug)]
pub enum PitchError {
    /// A parameter was outside its valid domain (scale, delay, gain, window sizes...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsupported or malformed audio format.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decoding or encoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Malformed pipeline configuration.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PitchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PitchError::InvalidArgument(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PitchError>;
