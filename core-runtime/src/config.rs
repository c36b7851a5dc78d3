//! # Core Configuration Module
//!
//! Provides configuration management for the Music Discovery Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges and settings for the catalog client and
//! the playback engine. It enforces fail-fast validation so a host learns about
//! a missing capability at start-up rather than on the first catalog request.
//!
//! ## Bridges
//!
//! - `HttpClient` - used by relay transports (desktop default: reqwest)
//! - `ScriptHost` - used by the script-tag bridge (browser only)
//! - `Clock` - cache timestamps (default: [`SystemClock`])
//!
//! At least one catalog transport must be constructible: either a script host
//! with the script bridge enabled, or an HTTP client with at least one relay.
//!
//! When the `desktop-shims` feature is enabled, a reqwest-backed `HttpClient`
//! is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, RelayEndpoint};
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .cache_ttl(Duration::from_secs(300))
//!     .relays(vec![RelayEndpoint::direct()])
//!     .initial_volume(0.5)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! // Without desktop-shims and without any bridge this fails with
//! // `Error::CapabilityMissing { capability: "CatalogTransport", .. }`.
//! let result = CoreConfig::builder().build();
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, ScriptHost, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default catalog API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://api.deezer.com";
/// Default validity window for cached catalog responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Default time to wait for a script-tag callback.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time to wait for one relay request.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(8);
/// Default prefix of the global callback names used by the script bridge.
pub const DEFAULT_CALLBACK_PREFIX: &str = "deezer_callback";
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_VOLUME: f32 = 0.7;
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Placeholder replaced by the percent-encoded target URL.
pub const RELAY_ENCODED_PLACEHOLDER: &str = "{url}";
/// Placeholder replaced by the target URL verbatim.
pub const RELAY_RAW_PLACEHOLDER: &str = "{raw}";

/// One HTTP relay strategy, tried after the script bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    /// Short label used in logs and failure reports.
    pub name: String,
    /// URL template containing `{url}` or `{raw}`.
    pub template: String,
}

impl RelayEndpoint {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// A relay that requests the catalog URL directly.
    ///
    /// Only useful on hosts without a cross-origin boundary.
    pub fn direct() -> Self {
        Self::new("direct", RELAY_RAW_PLACEHOLDER)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("Relay name cannot be empty".to_string()));
        }
        if !self.template.contains(RELAY_ENCODED_PLACEHOLDER)
            && !self.template.contains(RELAY_RAW_PLACEHOLDER)
        {
            return Err(Error::Config(format!(
                "Relay '{}' template must contain {} or {}",
                self.name, RELAY_ENCODED_PLACEHOLDER, RELAY_RAW_PLACEHOLDER
            )));
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_relays() -> Vec<RelayEndpoint> {
    vec![RelayEndpoint::direct()]
}

#[cfg(target_arch = "wasm32")]
fn default_relays() -> Vec<RelayEndpoint> {
    vec![
        RelayEndpoint::new("corsproxy", "https://corsproxy.io/?{url}"),
        RelayEndpoint::new("allorigins", "https://api.allorigins.win/raw?url={url}"),
    ]
}

/// Settings for the remote catalog client.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub cache_ttl: Duration,
    pub script_timeout: Duration,
    pub relay_timeout: Duration,
    /// Relays in priority order.
    pub relays: Vec<RelayEndpoint>,
    /// Try the script-tag bridge first when a `ScriptHost` is available.
    pub enable_script_bridge: bool,
    pub callback_prefix: String,
    pub default_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            relay_timeout: DEFAULT_RELAY_TIMEOUT,
            relays: default_relays(),
            enable_script_bridge: true,
            callback_prefix: DEFAULT_CALLBACK_PREFIX.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(Error::Config(format!(
                "API base URL must be http(s), got '{}'",
                base
            )));
        }

        if self.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Cache TTL must be greater than 0".to_string(),
            ));
        }
        if self.script_timeout.is_zero() || self.relay_timeout.is_zero() {
            return Err(Error::Config(
                "Transport timeouts must be greater than 0".to_string(),
            ));
        }

        let prefix_ok = !self.callback_prefix.is_empty()
            && self
                .callback_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !prefix_ok {
            return Err(Error::Config(
                "Callback prefix must be a non-empty identifier ([A-Za-z0-9_])".to_string(),
            ));
        }

        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "Default page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        for relay in &self.relays {
            relay.validate()?;
        }

        Ok(())
    }
}

/// Settings for the playback engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    /// Volume applied to the device when the engine is created.
    pub initial_volume: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::Config(format!(
                "Initial volume must be within 0.0..=1.0, got {}",
                self.initial_volume
            )));
        }
        Ok(())
    }
}

/// Core configuration for the Music Discovery Core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub catalog: CatalogConfig,
    pub player: PlayerConfig,

    /// HTTP client for relay transports (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Script-tag injection for the cross-origin bridge (browser hosts)
    pub script_host: Option<Arc<dyn ScriptHost>>,

    /// Time source for cache expiry
    pub clock: Arc<dyn Clock>,

    /// Capacity of the broadcast event bus
    pub event_bus_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("catalog", &self.catalog)
            .field("player", &self.player)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field(
                "script_host",
                &self.script_host.as_ref().map(|_| "ScriptHost { ... }"),
            )
            .field("clock", &"Clock { ... }")
            .field("event_bus_capacity", &self.event_bus_capacity)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Whether the script-tag bridge will take part in the transport chain.
    pub fn uses_script_bridge(&self) -> bool {
        self.catalog.enable_script_bridge && self.script_host.is_some()
    }

    /// Whether relay transports will take part in the transport chain.
    pub fn uses_relays(&self) -> bool {
        self.http_client.is_some() && !self.catalog.relays.is_empty()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Catalog and player settings are in range
    /// - At least one catalog transport can be built from the provided bridges
    /// - Event bus capacity is non-zero
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.player.validate()?;

        if self.event_bus_capacity == 0 {
            return Err(Error::Config(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        if !self.uses_script_bridge() && !self.uses_relays() {
            return Err(transport_missing_error());
        }

        Ok(())
    }
}

fn transport_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CatalogTransport".to_string(),
        message: "No catalog transport can be constructed. \
                 Web: inject a ScriptHost (and keep the script bridge enabled) or an HttpClient with relays. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Option<Arc<dyn HttpClient>>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(Some(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Option<Arc<dyn HttpClient>>> {
    Ok(None)
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    catalog: CatalogConfig,
    player: PlayerConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    script_host: Option<Arc<dyn ScriptHost>>,
    clock: Option<Arc<dyn Clock>>,
    event_bus_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Replaces all catalog settings at once.
    pub fn catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the catalog API origin.
    ///
    /// Default: `https://api.deezer.com`
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog.api_base_url = url.into();
        self
    }

    /// Sets how long successful catalog responses are reused.
    ///
    /// Default: 5 minutes
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog.cache_ttl = ttl;
        self
    }

    /// Default: 10 seconds
    pub fn script_timeout(mut self, timeout: Duration) -> Self {
        self.catalog.script_timeout = timeout;
        self
    }

    /// Default: 8 seconds
    pub fn relay_timeout(mut self, timeout: Duration) -> Self {
        self.catalog.relay_timeout = timeout;
        self
    }

    /// Sets the relay strategies, in the order they are tried.
    pub fn relays(mut self, relays: Vec<RelayEndpoint>) -> Self {
        self.catalog.relays = relays;
        self
    }

    /// Enables or disables the script-tag bridge.
    ///
    /// Default: true (only effective when a `ScriptHost` is provided)
    pub fn enable_script_bridge(mut self, enabled: bool) -> Self {
        self.catalog.enable_script_bridge = enabled;
        self
    }

    pub fn callback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.catalog.callback_prefix = prefix.into();
        self
    }

    /// Default: 25
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.catalog.default_page_size = size;
        self
    }

    /// Default: 0.7
    pub fn initial_volume(mut self, volume: f32) -> Self {
        self.player.initial_volume = volume;
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the script host used by the cross-origin script bridge.
    pub fn script_host(mut self, host: Arc<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    /// Overrides the time source.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Default: 256
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - No catalog transport can be built (`CapabilityMissing`)
    /// - Configuration values are invalid (`Config`)
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = match self.http_client {
            Some(client) => Some(client),
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            catalog: self.catalog,
            player: self.player,
            http_client,
            script_host: self.script_host,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_bus_capacity: self
                .event_bus_capacity
                .unwrap_or(DEFAULT_EVENT_BUS_CAPACITY),
        };

        config.validate()?;

        Ok(config)
    }
}
