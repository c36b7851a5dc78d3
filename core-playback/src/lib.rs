//! # Playback Engine
//!
//! Plays 30-second track previews through a host audio device.
//!
//! ## Overview
//!
//! This crate handles:
//! - The play queue and its cursor ([`PlayQueue`])
//! - The Idle / Paused / Playing state machine ([`PlaybackEngine`])
//! - Device notifications: metadata, progress, end of clip, failures
//! - Auto-advance through the queue without wrapping
//!
//! The device itself is a [`bridge_traits::playback::AudioTransport`]
//! supplied by the host; `bridge-wasm` provides one over `HtmlAudioElement`.

pub mod engine;
pub mod error;
pub mod pump;
pub mod queue;
pub mod state;

pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use pump::pump_device_events;
pub use queue::PlayQueue;
pub use state::{PlaybackSnapshot, PlayerStatus};
