//! `HtmlAudioElement` playback device.
//!
//! Commands map directly onto the media element. Media events are forwarded
//! as [`DeviceEvent`]s over an unbounded channel; the receiving half goes to
//! `core_playback::pump_device_events`.

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    playback::{AudioTransport, DeviceEvent},
};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlAudioElement};

use crate::error::{js_error, js_message};

type Listener = (&'static str, Closure<dyn FnMut(Event)>);

pub struct HtmlAudioTransport {
    element: HtmlAudioElement,
    events: UnboundedSender<DeviceEvent>,
    listeners: Vec<Listener>,
}

impl HtmlAudioTransport {
    /// Create a detached audio element and the stream of its events.
    pub fn new() -> BridgeResult<(Self, UnboundedReceiver<DeviceEvent>)> {
        let element = HtmlAudioElement::new().map_err(|err| js_error("create audio", err))?;
        element.set_preload("metadata");

        let (sender, receiver) = mpsc::unbounded();
        let mut transport = Self {
            element,
            events: sender,
            listeners: Vec::new(),
        };

        transport.listen("loadedmetadata", |element| {
            let duration = element.duration();
            duration
                .is_finite()
                .then_some(DeviceEvent::MetadataReady { duration })
        })?;
        transport.listen("timeupdate", |element| {
            Some(DeviceEvent::PositionTick {
                position: element.current_time(),
            })
        })?;
        // A new source resets `ended`, so a late event for the old clip is dropped.
        transport.listen("ended", |element| element.ended().then_some(DeviceEvent::Ended))?;
        transport.listen("error", |element| {
            let message = match element.error() {
                Some(error) => media_error_message(error.code()),
                None => "unknown media error".to_string(),
            };
            Some(DeviceEvent::Error { message })
        })?;

        Ok((transport, receiver))
    }

    fn listen<F>(&mut self, name: &'static str, map: F) -> BridgeResult<()>
    where
        F: Fn(&HtmlAudioElement) -> Option<DeviceEvent> + 'static,
    {
        let element = self.element.clone();
        let sender = self.events.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(event) = map(&element) {
                // The receiver is gone once the engine shuts down.
                let _ = sender.unbounded_send(event);
            }
        });

        self.element
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(|err| js_error("add media listener", err))?;
        self.listeners.push((name, closure));
        Ok(())
    }
}

impl AudioTransport for HtmlAudioTransport {
    fn set_source(&self, url: Option<&str>) -> BridgeResult<()> {
        match url {
            Some(url) => self.element.set_src(url),
            None => {
                self.element
                    .remove_attribute("src")
                    .map_err(|err| js_error("clear source", err))?;
                self.element.load();
            }
        }
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        let promise = self
            .element
            .play()
            .map_err(|err| BridgeError::OperationFailed(js_message(&err)))?;

        let sender = self.events.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                let message = js_message(&err);
                // A newer source or a pause interrupted this play request.
                if message.starts_with("AbortError") {
                    debug!(%message, "Play request superseded");
                    return;
                }
                warn!(%message, "Audio playback rejected");
                let _ = sender.unbounded_send(DeviceEvent::Error { message });
            }
        });
        Ok(())
    }

    fn pause(&self) {
        if let Err(err) = self.element.pause() {
            warn!(error = %js_message(&err), "Failed to pause audio");
        }
    }

    fn set_position(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn position(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.element.duration();
        duration.is_finite().then_some(duration)
    }

    fn set_volume(&self, volume: f32) {
        self.element.set_volume(f64::from(volume.clamp(0.0, 1.0)));
    }

    fn volume(&self) -> f32 {
        self.element.volume() as f32
    }
}

impl Drop for HtmlAudioTransport {
    fn drop(&mut self) {
        let _ = self.element.pause();
        for (name, closure) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        self.events.close_channel();
    }
}

fn media_error_message(code: u16) -> String {
    match code {
        1 => "MEDIA_ERR_ABORTED: playback aborted".to_string(),
        2 => "MEDIA_ERR_NETWORK: network error while loading audio".to_string(),
        3 => "MEDIA_ERR_DECODE: audio could not be decoded".to_string(),
        4 => "MEDIA_ERR_SRC_NOT_SUPPORTED: audio source not supported".to_string(),
        other => format!("media error {other}"),
    }
}
