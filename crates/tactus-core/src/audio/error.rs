//! Audio backend error types

use thiserror::Error;

/// Errors that can occur while acquiring the playback device
///
/// All of these are fatal to engine construction; the caller decides whether
/// to abort or run without audio.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio output device available
    #[error("No audio output device found")]
    NoDevice,

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Failed to start/play stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),

    /// Unsupported sample format
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;
