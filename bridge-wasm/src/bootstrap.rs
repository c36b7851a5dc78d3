//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells call [`build_wasm_bridges`] once at startup and hand the
//! resulting trait objects to `core-service`. This is the browser counterpart
//! of constructing `bridge-desktop` adapters on native targets.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    http::HttpClient,
    playback::{AudioTransport, DeviceEvent},
    script::ScriptHost,
};
use futures::channel::mpsc::UnboundedReceiver;
use tracing::info;

use crate::{audio::HtmlAudioTransport, http::WasmHttpClient, script::DomScriptHost};

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// Script-tag host for the cross-origin catalog bridge.
    pub script_host: Arc<dyn ScriptHost>,
    /// Audio element driving playback.
    pub audio: Arc<dyn AudioTransport>,
    /// Events raised by the audio element. Feed these to the playback engine.
    pub device_events: UnboundedReceiver<DeviceEvent>,
}

impl WasmBridgeSet {
    pub fn http(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.http_client)
    }

    pub fn script_host(&self) -> Arc<dyn ScriptHost> {
        Arc::clone(&self.script_host)
    }

    pub fn audio(&self) -> Arc<dyn AudioTransport> {
        Arc::clone(&self.audio)
    }
}

/// Build the default wasm bridge stack.
pub fn build_wasm_bridges() -> BridgeResult<WasmBridgeSet> {
    let http_client: Arc<dyn HttpClient> = Arc::new(WasmHttpClient::new()?);
    let script_host: Arc<dyn ScriptHost> = Arc::new(DomScriptHost::new()?);
    let (audio, device_events) = HtmlAudioTransport::new()?;

    info!("Browser bridges ready");

    Ok(WasmBridgeSet {
        http_client,
        script_host,
        audio: Arc::new(audio),
        device_events,
    })
}

/// Route Rust panics to the browser console.
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}
