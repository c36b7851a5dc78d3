//! Playback engine tests
//!
//! The engine drives a recording device so every command it sends can be
//! checked alongside the engine state:
//! - Queue loading and cursor bounds
//! - Auto-advance and end-of-queue behavior
//! - Device failures landing in paused
//! - Volume and seek clamping
//! - Published playback events

use std::sync::Arc;

use bridge_traits::{error::BridgeError, AudioTransport, DeviceEvent};
use core_catalog::models::{ArtistRef, CatalogId, Track};
use core_playback::{pump_device_events, PlaybackEngine, PlaybackError, PlayerStatus};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use tokio::sync::broadcast::Receiver;

// ============================================================================
// Recording device
// ============================================================================

#[derive(Debug, Default)]
struct DeviceState {
    source: Option<String>,
    playing: bool,
    position: f64,
    volume: f32,
    reject_play: bool,
    sources_set: usize,
}

#[derive(Debug, Default)]
struct RecordingDevice {
    state: Mutex<DeviceState>,
}

impl RecordingDevice {
    fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }
}

impl AudioTransport for RecordingDevice {
    fn set_source(&self, url: Option<&str>) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.source = url.map(str::to_string);
        state.position = 0.0;
        state.playing = false;
        state.sources_set += 1;
        Ok(())
    }

    fn play(&self) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        if state.reject_play {
            return Err(BridgeError::OperationFailed("NotAllowedError".to_string()));
        }
        state.playing = state.source.is_some();
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn set_position(&self, seconds: f64) {
        self.state.lock().position = seconds;
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn track(id: &str) -> Track {
    Track {
        id: CatalogId::new(id),
        title: format!("Track {}", id.to_uppercase()),
        title_short: None,
        artist: ArtistRef {
            id: CatalogId::new("27"),
            name: "Daft Punk".to_string(),
            picture_small: None,
            picture_medium: None,
        },
        album: None,
        preview: Some(preview(id)),
        duration: 210,
        rank: None,
        bpm: None,
        release_date: None,
    }
}

fn preview(id: &str) -> String {
    format!("https://cdn.example/preview/{}.mp3", id)
}

fn abc() -> Vec<Track> {
    vec![track("a"), track("b"), track("c")]
}

fn engine() -> (Arc<PlaybackEngine>, Arc<RecordingDevice>) {
    let device = Arc::new(RecordingDevice::default());
    let engine = PlaybackEngine::new(device.clone(), &PlayerConfig::default());
    (Arc::new(engine), device)
}

fn engine_with_events() -> (PlaybackEngine, Arc<RecordingDevice>, Receiver<CoreEvent>) {
    let device = Arc::new(RecordingDevice::default());
    let bus = EventBus::new(64);
    let events = bus.subscribe();
    let engine = PlaybackEngine::new(device.clone(), &PlayerConfig::default()).with_event_bus(bus);
    (engine, device, events)
}

/// Simulate the device loading metadata and playing a clip to its end.
fn finish_current(engine: &PlaybackEngine) {
    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });
    engine.handle_device_event(DeviceEvent::Ended);
}

/// Simulate a progress report, keeping the device position in step.
fn tick(engine: &PlaybackEngine, device: &RecordingDevice, position: f64) {
    device.state.lock().position = position;
    engine.handle_device_event(DeviceEvent::PositionTick { position });
}

fn drain(events: &mut Receiver<CoreEvent>) -> Vec<PlaybackEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Playback(event) = event {
            out.push(event);
        }
    }
    out
}

// ============================================================================
// Loading and navigation
// ============================================================================

#[test]
fn test_initial_state() {
    let (engine, device) = engine();
    let snapshot = engine.snapshot();

    assert_eq!(snapshot.status, PlayerStatus::Idle);
    assert!(snapshot.current_track.is_none());
    assert_eq!(snapshot.cursor, None);
    assert_eq!(snapshot.volume, 0.7);
    assert_eq!(device.volume(), 0.7);
}

#[test]
fn test_play_loads_queue_and_starts_track() {
    let (engine, device) = engine();

    engine.play(track("b"), abc());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Playing);
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.queue.len(), 3);
    assert_eq!(device.source(), Some(preview("b")));
    assert!(device.is_playing());
}

#[test]
fn test_play_prepends_track_missing_from_list() {
    let (engine, device) = engine();

    engine.play(track("x"), abc());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(snapshot.queue.len(), 4);
    assert_eq!(snapshot.current_track.unwrap().id.as_str(), "x");
    assert_eq!(device.source(), Some(preview("x")));
}

#[test]
fn test_commands_are_no_ops_while_idle() {
    let (engine, device) = engine();

    engine.pause();
    engine.resume();
    engine.next();
    engine.prev();
    engine.seek(10.0);
    engine.handle_device_event(DeviceEvent::Ended);
    engine.handle_device_event(DeviceEvent::Error {
        message: "boom".to_string(),
    });

    assert_eq!(engine.status(), PlayerStatus::Idle);
    assert_eq!(device.state.lock().sources_set, 0);
}

#[test]
fn test_next_at_last_track_keeps_playing_without_wrapping() {
    let (engine, device) = engine();
    engine.play(track("b"), abc());

    engine.next();
    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(device.source(), Some(preview("c")));

    let sources_before = device.state.lock().sources_set;
    engine.next();
    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(device.state.lock().sources_set, sources_before);
    assert_eq!(engine.status(), PlayerStatus::Playing);
    assert!(device.is_playing());
}

#[test]
fn test_next_from_paused_starts_playing() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());
    engine.pause();
    assert!(!device.is_playing());

    engine.next();

    assert_eq!(engine.status(), PlayerStatus::Playing);
    assert!(device.is_playing());
}

#[test]
fn test_prev_retreats_or_restarts() {
    let (engine, device) = engine();
    engine.play(track("b"), abc());

    engine.prev();
    assert_eq!(engine.snapshot().cursor, Some(0));
    assert_eq!(device.source(), Some(preview("a")));

    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });
    tick(&engine, &device, 12.0);
    assert_eq!(engine.snapshot().position, 12.0);

    engine.prev();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(snapshot.position, 0.0);
    assert_eq!(device.position(), 0.0);
    assert_eq!(device.source(), Some(preview("a")));
}

#[test]
fn test_play_at() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    engine.play_at(2).unwrap();
    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(device.source(), Some(preview("c")));

    assert_eq!(
        engine.play_at(3),
        Err(PlaybackError::QueueIndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(engine.snapshot().cursor, Some(2));
}

// ============================================================================
// Auto-advance
// ============================================================================

#[test]
fn test_ended_advances_through_queue_then_pauses() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    finish_current(&engine);
    assert_eq!(engine.snapshot().cursor, Some(1));
    assert_eq!(device.source(), Some(preview("b")));

    finish_current(&engine);
    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(engine.status(), PlayerStatus::Playing);

    finish_current(&engine);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Paused);
    assert_eq!(snapshot.cursor, Some(2));
    assert_eq!(snapshot.current_track.unwrap().id.as_str(), "c");
}

#[test]
fn test_single_track_completion() {
    let (engine, _device) = engine();
    let t = track("t");

    engine.play(t.clone(), vec![t]);
    assert_eq!(engine.status(), PlayerStatus::Playing);
    assert_eq!(engine.snapshot().cursor, Some(0));

    finish_current(&engine);
    assert_eq!(engine.status(), PlayerStatus::Paused);
    assert_eq!(engine.snapshot().cursor, Some(0));
}

#[test]
fn test_single_track_ends_without_metadata() {
    let (engine, device) = engine();
    let t = track("t");
    engine.play(t.clone(), vec![t]);

    engine.handle_device_event(DeviceEvent::Ended);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Paused);
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(device.source(), Some(preview("t")));
}

#[test]
fn test_bare_ended_advances_through_queue() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(engine.snapshot().cursor, Some(1));
    assert_eq!(device.source(), Some(preview("b")));

    engine.handle_device_event(DeviceEvent::Ended);
    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(engine.status(), PlayerStatus::Playing);

    engine.handle_device_event(DeviceEvent::Ended);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Paused);
    assert_eq!(snapshot.cursor, Some(2));
}

#[test]
fn test_non_finite_duration_still_advances() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    engine.handle_device_event(DeviceEvent::MetadataReady {
        duration: f64::INFINITY,
    });
    assert_eq!(engine.snapshot().duration, 0.0);

    engine.handle_device_event(DeviceEvent::Ended);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.status, PlayerStatus::Playing);
    assert_eq!(device.source(), Some(preview("b")));
}

#[test]
fn test_ended_reads_cursor_at_fire_time() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    // The user jumped to "b" before the clip ended.
    engine.play(track("b"), abc());
    engine.handle_device_event(DeviceEvent::Ended);

    assert_eq!(engine.snapshot().cursor, Some(2));
    assert_eq!(device.source(), Some(preview("c")));
}

#[test]
fn test_ended_while_paused_is_ignored() {
    let (engine, _device) = engine();
    engine.play(track("a"), abc());
    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });
    engine.pause();

    engine.handle_device_event(DeviceEvent::Ended);

    assert_eq!(engine.snapshot().cursor, Some(0));
    assert_eq!(engine.status(), PlayerStatus::Paused);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_device_error_pauses_and_keeps_queue() {
    let (engine, device, mut events) = engine_with_events();
    engine.play(track("b"), abc());
    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });
    tick(&engine, &device, 4.0);
    drain(&mut events);

    engine.handle_device_event(DeviceEvent::Error {
        message: "MEDIA_ERR_NETWORK".to_string(),
    });

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Paused);
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.queue.len(), 3);
    assert_eq!(snapshot.current_track.unwrap().id.as_str(), "b");
    assert_eq!(snapshot.position, 4.0);
    assert!(!device.is_playing());
    assert_eq!(
        drain(&mut events),
        vec![PlaybackEvent::Error {
            track_id: Some("b".to_string()),
            message: "MEDIA_ERR_NETWORK".to_string(),
            recoverable: true,
        }]
    );
}

#[test]
fn test_rejected_play_is_treated_like_device_error() {
    let (engine, device) = engine();
    device.reject_play(true);

    engine.play(track("a"), abc());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Paused);
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(device.source(), Some(preview("a")));

    device.reject_play(false);
    engine.resume();
    assert_eq!(engine.status(), PlayerStatus::Playing);
    assert!(device.is_playing());
}

#[test]
fn test_track_without_preview_is_not_attempted() {
    let (engine, device, mut events) = engine_with_events();
    let mut silent = track("s");
    silent.preview = None;

    engine.play(silent.clone(), vec![silent]);

    assert_eq!(engine.status(), PlayerStatus::Paused);
    assert_eq!(device.source(), None);
    assert!(!device.is_playing());

    let published = drain(&mut events);
    assert!(published.iter().any(|event| matches!(
        event,
        PlaybackEvent::Error { recoverable: false, track_id: Some(id), .. } if id == "s"
    )));
}

// ============================================================================
// Volume, seek, stop
// ============================================================================

#[test]
fn test_volume_is_clamped() {
    let (engine, device) = engine();

    engine.set_volume(-0.5);
    assert_eq!(engine.snapshot().volume, 0.0);
    assert_eq!(device.volume(), 0.0);

    engine.set_volume(1.7);
    assert_eq!(engine.snapshot().volume, 1.0);
    assert_eq!(device.volume(), 1.0);

    engine.set_volume(f32::NAN);
    assert_eq!(engine.snapshot().volume, 1.0);
}

#[test]
fn test_seek_is_clamped_to_duration() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());
    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });

    engine.seek(45.0);
    assert_eq!(engine.snapshot().position, 30.0);
    assert_eq!(device.position(), 30.0);

    engine.seek(-3.0);
    assert_eq!(engine.snapshot().position, 0.0);

    engine.pause();
    engine.seek(10.0);
    assert_eq!(engine.snapshot().position, 10.0);
    assert_eq!(device.position(), 10.0);
}

#[test]
fn test_position_ticks_only_count_while_playing() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());
    engine.handle_device_event(DeviceEvent::MetadataReady { duration: 30.0 });
    tick(&engine, &device, 5.0);
    engine.pause();
    assert_eq!(engine.snapshot().position, 5.0);

    engine.handle_device_event(DeviceEvent::PositionTick { position: 9.0 });
    assert_eq!(engine.snapshot().position, 5.0);

    engine.resume();
    tick(&engine, &device, 45.0);
    assert_eq!(engine.snapshot().position, 30.0);
}

#[test]
fn test_toggle() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    engine.toggle();
    assert_eq!(engine.status(), PlayerStatus::Paused);
    assert!(!device.is_playing());

    engine.toggle();
    assert_eq!(engine.status(), PlayerStatus::Playing);
    assert!(device.is_playing());
}

#[test]
fn test_stop_returns_to_idle() {
    let (engine, device, mut events) = engine_with_events();
    engine.play(track("a"), abc());
    drain(&mut events);

    engine.stop();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Idle);
    assert!(snapshot.queue.is_empty());
    assert_eq!(snapshot.cursor, None);
    assert_eq!(device.source(), None);
    assert_eq!(
        drain(&mut events),
        vec![
            PlaybackEvent::Stopped {
                track_id: Some("a".to_string())
            },
            PlaybackEvent::QueueChanged {
                length: 0,
                cursor: None
            },
        ]
    );
}

// ============================================================================
// Events and pump
// ============================================================================

#[test]
fn test_play_publishes_queue_and_start() {
    let (engine, _device, mut events) = engine_with_events();

    engine.play(track("b"), abc());

    assert_eq!(
        drain(&mut events),
        vec![
            PlaybackEvent::QueueChanged {
                length: 3,
                cursor: Some(1)
            },
            PlaybackEvent::Started {
                track_id: "b".to_string(),
                title: "Track B".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_pump_drives_engine_until_stream_ends() {
    let (engine, device) = engine();
    engine.play(track("a"), abc());

    let stream = futures::stream::iter(vec![
        DeviceEvent::MetadataReady { duration: 30.0 },
        DeviceEvent::PositionTick { position: 29.5 },
        DeviceEvent::Ended,
    ]);
    let delivered = pump_device_events(&engine, stream).await;

    assert_eq!(delivered, 3);
    assert_eq!(engine.snapshot().cursor, Some(1));
    assert_eq!(device.source(), Some(preview("b")));
}
