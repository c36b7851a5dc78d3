//! # Playback Engine
//!
//! Owns the playback device, the play queue and the player state machine.
//!
//! ```text
//!              play / next / prev / play_at
//!   ┌──────┐ ───────────────────────────────> ┌─────────┐
//!   │ Idle │                                  │ Playing │
//!   └──────┘ <──── stop ────┐                 └─────────┘
//!                           │      pause, error,  │  ▲
//!                      ┌────────┐  last ended     │  │ resume, play,
//!                      │ Paused │ <───────────────┘  │ next, prev
//!                      └────────┘ ───────────────────┘
//! ```
//!
//! Commands are synchronous. Device notifications arrive separately through
//! [`PlaybackEngine::handle_device_event`], usually driven by
//! [`pump_device_events`](crate::pump::pump_device_events). Both read the
//! queue and cursor as they are when they run: `Ended` while playing always
//! advances from the current cursor, whether or not metadata arrived.
//!
//! Device failures are never returned to the caller. The engine logs them,
//! lands in [`PlayerStatus::Paused`] with the queue untouched and publishes a
//! `PlaybackEvent::Error`.

use std::sync::Arc;

use bridge_traits::playback::{AudioTransport, DeviceEvent};
use core_catalog::models::Track;
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::queue::PlayQueue;
use crate::state::{PlaybackSnapshot, PlayerStatus};

#[derive(Debug)]
struct EngineState {
    queue: PlayQueue,
    status: PlayerStatus,
    position: f64,
    duration: f64,
    volume: f32,
}

impl EngineState {
    fn current_id(&self) -> Option<String> {
        self.queue.current().map(|t| t.id.to_string())
    }

    fn queue_changed(&self) -> PlaybackEvent {
        PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            cursor: self.queue.cursor(),
        }
    }

    fn reset_timeline(&mut self) {
        self.position = 0.0;
        self.duration = 0.0;
    }
}

pub struct PlaybackEngine {
    device: Arc<dyn AudioTransport>,
    state: Mutex<EngineState>,
    events: Option<EventBus>,
}

impl PlaybackEngine {
    /// Creates an idle engine and applies the configured initial volume.
    pub fn new(device: Arc<dyn AudioTransport>, config: &PlayerConfig) -> Self {
        let volume = clamp_volume(config.initial_volume).unwrap_or(0.0);
        device.set_volume(volume);

        Self {
            device,
            state: Mutex::new(EngineState {
                queue: PlayQueue::new(),
                status: PlayerStatus::Idle,
                position: 0.0,
                duration: 0.0,
                volume,
            }),
            events: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Replace the queue with `list` and start `track`.
    pub fn play(&self, track: Track, list: Vec<Track>) {
        let events = {
            let mut state = self.state.lock();
            state.queue.load(track, list);
            let mut events = vec![state.queue_changed()];
            events.extend(self.start_current(&mut state));
            events
        };
        self.publish(events);
    }

    /// Jump to queue position `index` and start it.
    pub fn play_at(&self, index: usize) -> Result<()> {
        let events = {
            let mut state = self.state.lock();
            state.queue.jump(index)?;
            let mut events = vec![state.queue_changed()];
            events.extend(self.start_current(&mut state));
            events
        };
        self.publish(events);
        Ok(())
    }

    pub fn pause(&self) {
        let events = {
            let mut state = self.state.lock();
            if state.status != PlayerStatus::Playing {
                return;
            }
            self.pause_device(&mut state);
            debug!(position = state.position, "Playback paused");
            state
                .current_id()
                .map(|track_id| PlaybackEvent::Paused {
                    track_id,
                    position_ms: to_millis(state.position),
                })
                .into_iter()
                .collect()
        };
        self.publish(events);
    }

    /// Continue the current track from where it was paused.
    pub fn resume(&self) {
        let events = {
            let mut state = self.state.lock();
            if state.status != PlayerStatus::Paused {
                return;
            }
            let Some(track) = state.queue.current().cloned() else {
                return;
            };

            let started = match track.preview.as_deref() {
                Some(_) => self.device.play().map_err(PlaybackError::from),
                None => Err(PlaybackError::MissingPreview {
                    track_id: track.id.to_string(),
                }),
            };

            match started {
                Ok(()) => {
                    state.status = PlayerStatus::Playing;
                    debug!(track_id = %track.id, "Playback resumed");
                    vec![PlaybackEvent::Resumed {
                        track_id: track.id.to_string(),
                        position_ms: to_millis(state.position),
                    }]
                }
                Err(error) => vec![self.fail(&mut state, error.to_string(), error.is_recoverable())],
            }
        };
        self.publish(events);
    }

    /// Pause when playing, resume when paused.
    pub fn toggle(&self) {
        let status = self.state.lock().status;
        match status {
            PlayerStatus::Playing => self.pause(),
            PlayerStatus::Paused => self.resume(),
            PlayerStatus::Idle => {}
        }
    }

    /// Unload everything and return to idle.
    pub fn stop(&self) {
        let events = {
            let mut state = self.state.lock();
            if state.status == PlayerStatus::Idle && state.queue.is_empty() {
                return;
            }
            let track_id = state.current_id();

            self.device.pause();
            if let Err(e) = self.device.set_source(None) {
                warn!(error = %e, "Failed to detach playback source");
            }
            state.queue.clear();
            state.status = PlayerStatus::Idle;
            state.reset_timeline();
            debug!("Playback stopped");

            vec![PlaybackEvent::Stopped { track_id }, state.queue_changed()]
        };
        self.publish(events);
    }

    /// Start the next queued track. Does nothing at the end of the queue.
    pub fn next(&self) {
        let events = {
            let mut state = self.state.lock();
            if !state.status.is_loaded() || !state.queue.advance() {
                return;
            }
            let mut events = vec![state.queue_changed()];
            events.extend(self.start_current(&mut state));
            events
        };
        self.publish(events);
    }

    /// Start the previous track, or restart the current one at the front of
    /// the queue.
    pub fn prev(&self) {
        let events = {
            let mut state = self.state.lock();
            if !state.status.is_loaded() {
                return;
            }
            if state.queue.retreat() {
                let mut events = vec![state.queue_changed()];
                events.extend(self.start_current(&mut state));
                events
            } else {
                state.position = 0.0;
                self.device.set_position(0.0);
                self.position_changed(&state).into_iter().collect()
            }
        };
        self.publish(events);
    }

    /// Move to `seconds`, clamped to the known duration.
    pub fn seek(&self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let events = {
            let mut state = self.state.lock();
            if !state.status.is_loaded() {
                return;
            }
            state.position = seconds.clamp(0.0, state.duration);
            self.device.set_position(state.position);
            self.position_changed(&state).into_iter().collect()
        };
        self.publish(events);
    }

    /// Set the output volume, clamped to `0.0..=1.0`. NaN is ignored.
    pub fn set_volume(&self, volume: f32) {
        let Some(volume) = clamp_volume(volume) else {
            return;
        };
        self.state.lock().volume = volume;
        self.device.set_volume(volume);
        self.publish(vec![PlaybackEvent::VolumeChanged { volume }]);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.state.lock();
        PlaybackSnapshot {
            current_track: state.queue.current().cloned(),
            status: state.status,
            position: state.position,
            duration: state.duration,
            volume: state.volume,
            queue: state.queue.tracks().to_vec(),
            cursor: state.queue.cursor(),
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.state.lock().status
    }

    // ========================================================================
    // Device events
    // ========================================================================

    pub fn handle_device_event(&self, event: DeviceEvent) {
        let events = {
            let mut state = self.state.lock();
            match event {
                DeviceEvent::MetadataReady { duration } => {
                    if state.status.is_loaded() && duration.is_finite() && duration >= 0.0 {
                        state.duration = duration;
                        debug!(duration, "Device metadata ready");
                    }
                    Vec::new()
                }
                DeviceEvent::PositionTick { position } => {
                    if state.status != PlayerStatus::Playing || !position.is_finite() {
                        return;
                    }
                    state.position = clamp_position(position, state.duration);
                    self.position_changed(&state).into_iter().collect()
                }
                DeviceEvent::Ended => self.on_ended(&mut state),
                DeviceEvent::Error { message } => {
                    if !state.status.is_loaded() {
                        return;
                    }
                    vec![self.fail(&mut state, message, true)]
                }
            }
        };
        self.publish(events);
    }

    fn on_ended(&self, state: &mut EngineState) -> Vec<PlaybackEvent> {
        if state.status != PlayerStatus::Playing {
            debug!("Ignoring end of clip while not playing");
            return Vec::new();
        }

        if state.queue.advance() {
            let mut events = vec![state.queue_changed()];
            events.extend(self.start_current(state));
            return events;
        }

        state.status = PlayerStatus::Paused;
        state.position = state.duration;
        info!("Reached the end of the queue");
        state
            .current_id()
            .map(|track_id| PlaybackEvent::Completed { track_id })
            .into_iter()
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Load the track under the cursor and start it.
    fn start_current(&self, state: &mut EngineState) -> Vec<PlaybackEvent> {
        let Some(track) = state.queue.current().cloned() else {
            return Vec::new();
        };
        state.reset_timeline();

        let Some(preview) = track.preview.as_deref() else {
            if let Err(e) = self.device.set_source(None) {
                warn!(error = %e, "Failed to detach playback source");
            }
            let error = PlaybackError::MissingPreview {
                track_id: track.id.to_string(),
            };
            return vec![self.fail(state, error.to_string(), error.is_recoverable())];
        };

        let started = self
            .device
            .set_source(Some(preview))
            .and_then(|_| self.device.play());

        match started {
            Ok(()) => {
                state.status = PlayerStatus::Playing;
                info!(track_id = %track.id, title = %track.title, "Playback started");
                vec![PlaybackEvent::Started {
                    track_id: track.id.to_string(),
                    title: track.title.clone(),
                }]
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                vec![self.fail(state, error.to_string(), error.is_recoverable())]
            }
        }
    }

    /// Land in paused after a failure. Queue, track and position are kept.
    fn fail(&self, state: &mut EngineState, message: String, recoverable: bool) -> PlaybackEvent {
        if state.status == PlayerStatus::Playing {
            self.pause_device(state);
        }
        state.status = PlayerStatus::Paused;

        let track_id = state.current_id();
        warn!(track_id = ?track_id, error = %message, "Playback failed, pausing");
        PlaybackEvent::Error {
            track_id,
            message,
            recoverable,
        }
    }

    fn pause_device(&self, state: &mut EngineState) {
        self.device.pause();
        let position = self.device.position();
        if position.is_finite() {
            state.position = clamp_position(position, state.duration);
        }
        state.status = PlayerStatus::Paused;
    }

    fn position_changed(&self, state: &EngineState) -> Option<PlaybackEvent> {
        state
            .current_id()
            .map(|track_id| PlaybackEvent::PositionChanged {
                track_id,
                position_ms: to_millis(state.position),
                duration_ms: to_millis(state.duration),
            })
    }

    fn publish(&self, events: Vec<PlaybackEvent>) {
        let Some(bus) = &self.events else {
            return;
        };
        for event in events {
            // No subscribers is not an error.
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &*self.state.lock())
            .finish()
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

/// Clamp to `[0, duration]`, or only from below while the duration is unknown.
fn clamp_position(position: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        position.clamp(0.0, duration)
    } else {
        position.max(0.0)
    }
}

fn to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}
