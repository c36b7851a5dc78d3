//! # Playback Error Types
//!
//! Device failures never escape the engine: they are logged, turned into a
//! paused state and published as `PlaybackEvent::Error`. Only caller mistakes
//! such as an out-of-range queue index are returned.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The playback device rejected a command or reported a failure.
    #[error("Audio device error: {0}")]
    Device(String),

    /// The track has no preview clip to load.
    #[error("Track {track_id} has no preview available")]
    MissingPreview { track_id: String },

    /// `play_at` was given an index past the end of the queue.
    #[error("Queue index {index} out of range (queue length {len})")]
    QueueIndexOutOfRange { index: usize, len: usize },
}

impl PlaybackError {
    /// Whether retrying the same track may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlaybackError::Device(_))
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(error: BridgeError) -> Self {
        PlaybackError::Device(error.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
