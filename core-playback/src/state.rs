//! Player state exposed to the UI

use core_catalog::models::Track;
use serde::{Deserialize, Serialize};

/// Engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Nothing loaded.
    #[default]
    Idle,
    /// A track is loaded and the device is not playing it.
    Paused,
    /// A track is loaded and the device is attempting playback.
    Playing,
}

impl PlayerStatus {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PlayerStatus::Idle)
    }
}

/// Read-only copy of the engine state.
///
/// Positions and durations are in seconds; `duration` is 0 until the device
/// has reported metadata for the current track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub status: PlayerStatus,
    pub position: f64,
    pub duration: f64,
    pub volume: f32,
    pub queue: Vec<Track>,
    pub cursor: Option<usize>,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Progress through the current track in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
