//! Playback device bridge.
//!
//! The core drives exactly one audio device at a time. Commands are
//! synchronous (they only instruct the device) while everything the device
//! learns later, such as media metadata, playback progress, the end of a clip
//! or a decode failure, comes back as a [`DeviceEvent`] through a channel owned
//! by the host.
//!
//! Implementations must never call back into the playback engine from inside a
//! command; events are queued and delivered by the host's event loop.

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Asynchronous notification emitted by a playback device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// Media metadata loaded; `duration` is in seconds.
    MetadataReady { duration: f64 },
    /// Periodic progress report while audio is running.
    PositionTick { position: f64 },
    /// The current source played to its end.
    Ended,
    /// Loading or playback failed.
    Error { message: String },
}

/// Single-source audio output.
///
/// Positions and durations are seconds. `duration` is `None` until the
/// device has loaded metadata for the current source.
pub trait AudioTransport: PlatformSendSync {
    /// Point the device at `url`, or detach it from any source with `None`.
    /// Setting a new source resets the device position to 0.
    fn set_source(&self, url: Option<&str>) -> Result<()>;

    /// Start or continue playback of the current source.
    fn play(&self) -> Result<()>;

    fn pause(&self);

    fn set_position(&self, seconds: f64);

    fn position(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    /// Volume is normalized to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    fn volume(&self) -> f32;
}
