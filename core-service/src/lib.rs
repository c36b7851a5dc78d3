//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, script host,
//! audio device) into the catalog client and the playback engine. Desktop
//! tooling enables the `desktop-shims` feature (reqwest-backed relays),
//! whereas WebAssembly builds enable the `wasm` feature and use the adapters
//! from `bridge-wasm`.

pub mod error;
pub mod favorites;
pub mod service;

pub use error::{CoreError, Result};
pub use favorites::{Favorite, FavoriteItem, FavoriteKind, Favorites};
pub use service::{DiscoveryService, GenrePage, TrackDetails};

pub use core_runtime::config::{CatalogConfig, CoreConfig, PlayerConfig, RelayEndpoint};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[cfg(any(feature = "desktop-shims", all(feature = "wasm", target_arch = "wasm32")))]
use std::sync::Arc;

#[cfg(any(feature = "desktop-shims", all(feature = "wasm", target_arch = "wasm32")))]
use bridge_traits::playback::AudioTransport;

/// Convenience bootstrapper for native hosts.
///
/// Catalog requests go through the default reqwest client and relays; the
/// host supplies the audio device and feeds its events to
/// [`DiscoveryService::attach_device_events`].
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(audio: Arc<dyn AudioTransport>) -> Result<DiscoveryService> {
    let config = CoreConfig::builder().build()?;
    DiscoveryService::new(&config, audio)
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// Builds the browser bridges, routes audio element events into the engine
/// and returns the ready service.
///
/// ```ignore
/// use core_service::{bootstrap_wasm, CatalogConfig};
///
/// let service = bootstrap_wasm(CatalogConfig::default())?;
/// let track = service.surprise_me().await?;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn bootstrap_wasm(catalog: CatalogConfig) -> Result<DiscoveryService> {
    bridge_wasm::install_panic_hook();

    let bridges = bridge_wasm::build_wasm_bridges()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let config = CoreConfig::builder()
        .catalog(catalog)
        .http_client(bridges.http())
        .script_host(bridges.script_host())
        .build()?;

    let audio: Arc<dyn AudioTransport> = bridges.audio();
    let service = DiscoveryService::new(&config, audio)?;
    service.attach_device_events(bridges.device_events);
    Ok(service)
}
