//! Error types for the tone pipeline.
//!
//! None of these are fatal: the pipeline logs them and skips the tone.

use thiserror::Error;

/// Why an inbound message was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The payload is not a tone object or a bare number
    #[error("malformed message")]
    MalformedMessage,

    /// `frequency` is missing, non-numeric, non-finite or not positive
    #[error("invalid frequency")]
    InvalidFrequency,

    /// `sineTerms` is present but is not a list of finite numbers
    #[error("invalid harmonics")]
    InvalidHarmonics,
}

/// Failures reported by an audio backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No audio output device is available
    #[error("no audio output device available")]
    NoOutputDevice,

    /// The output stream could not be built or started
    #[error("audio stream error: {0}")]
    Stream(String),

    /// A node's message queue is full; the update was dropped
    #[error("node message queue full")]
    QueueFull,

    /// The node does not exist (never created, or already released)
    #[error("unknown audio node")]
    UnknownNode,
}

/// Why a tone could not be played.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Playback was attempted before the audio output was activated
    #[error("audio backend not ready")]
    BackendNotReady,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Any failure on the path from inbound message to scheduled tone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToneError {
    #[error("rejected message: {0}")]
    Parse(#[from] ParseError),

    #[error("playback skipped: {0}")]
    Playback(#[from] PlaybackError),
}
