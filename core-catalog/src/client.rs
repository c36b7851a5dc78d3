//! Catalog Client
//!
//! The only component the rest of the core calls for catalog data. Every
//! request goes through the same steps:
//!
//! 1. Validate parameters by building an [`Endpoint`].
//! 2. Serve a fresh cache entry if one exists.
//! 3. Join an identical request already in flight, or start one through the
//!    [`TransportChain`].
//! 4. Cache successful payloads.
//! 5. When every transport fails, serve built-in data for the chart and genre
//!    list, and report the catalog as unavailable for everything else.
//!
//! ```ignore
//! use core_catalog::{CatalogClient, SearchOptions};
//!
//! let client = CatalogClient::from_core_config(&config)?;
//! let tracks = client.search("daft punk", SearchOptions::default()).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::time::Clock;
use core_runtime::config::{CatalogConfig, CoreConfig};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::cache::{CacheStats, ResponseCache};
use crate::endpoint::{Endpoint, EndpointKind};
use crate::error::{AttemptFailure, CatalogError, Result};
use crate::fallback;
use crate::models::{Album, Artist, Chart, Genre, Page, Track};
use crate::transport::{JsonpTransport, RelayTransport, TransportChain};

type FetchOutput = std::result::Result<Value, Vec<AttemptFailure>>;

#[cfg(not(target_arch = "wasm32"))]
type FetchFuture = futures::future::BoxFuture<'static, FetchOutput>;

#[cfg(target_arch = "wasm32")]
type FetchFuture = futures::future::LocalBoxFuture<'static, FetchOutput>;

/// Paging options for search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub index: u32,
    /// Page size; `None` uses the configured default.
    pub limit: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            index: 0,
            limit: None,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }
}

struct ClientInner {
    base_url: Url,
    default_limit: u32,
    cache: ResponseCache,
    chain: TransportChain,
    in_flight: Mutex<HashMap<String, Shared<FetchFuture>>>,
}

/// Cached, multi-transport catalog client. Cloning shares the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<ClientInner>,
    events: Option<EventBus>,
}

impl CatalogClient {
    /// Creates a client over an explicit transport chain.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] when the base URL cannot be parsed or
    /// the chain is empty.
    pub fn new(
        config: &CatalogConfig,
        clock: Arc<dyn Clock>,
        chain: TransportChain,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            CatalogError::Config(format!("invalid API base URL '{}': {}", config.api_base_url, e))
        })?;

        if chain.is_empty() {
            return Err(CatalogError::Config(
                "at least one catalog transport is required".to_string(),
            ));
        }

        debug!(transports = ?chain.names(), base_url = %base_url, "Catalog client created");

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                default_limit: config.default_page_size,
                cache: ResponseCache::new(config.cache_ttl, clock),
                chain,
                in_flight: Mutex::new(HashMap::new()),
            }),
            events: None,
        })
    }

    /// Creates a client from the core configuration, building the script
    /// bridge first and one relay transport per configured relay after it.
    pub fn from_core_config(config: &CoreConfig) -> Result<Self> {
        let catalog = &config.catalog;
        let mut chain = TransportChain::new();

        if config.uses_script_bridge() {
            if let Some(host) = &config.script_host {
                chain.push(Box::new(JsonpTransport::new(
                    Arc::clone(host),
                    &catalog.callback_prefix,
                    catalog.script_timeout,
                )));
            }
        }

        if let Some(client) = &config.http_client {
            for relay in &catalog.relays {
                chain.push(Box::new(RelayTransport::new(
                    relay,
                    Arc::clone(client),
                    catalog.relay_timeout,
                )));
            }
        }

        Self::new(catalog, Arc::clone(&config.clock), chain)
    }

    /// Publishes [`CatalogEvent`]s on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn default_limit(&self) -> u32 {
        self.inner.default_limit
    }

    // ------------------------------------------------------------------
    // Typed operations
    // ------------------------------------------------------------------

    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Track>> {
        let limit = options.limit.unwrap_or(self.inner.default_limit);
        let endpoint = Endpoint::search(query, options.index, limit)?;
        let page: Page<Track> = self.fetch_as(&endpoint).await?;
        Ok(page.data)
    }

    pub async fn get_track(&self, id: &str) -> Result<Track> {
        self.fetch_as(&Endpoint::track(id)?).await
    }

    /// Album with its track list; embedded tracks point back at the album.
    pub async fn get_album(&self, id: &str) -> Result<Album> {
        let mut album: Album = self.fetch_as(&Endpoint::album(id)?).await?;
        album.attach_album_to_tracks();
        Ok(album)
    }

    pub async fn get_artist(&self, id: &str) -> Result<Artist> {
        self.fetch_as(&Endpoint::artist(id)?).await
    }

    pub async fn get_artist_top_tracks(&self, id: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        let endpoint = Endpoint::artist_top_tracks(id, self.limit_or_default(limit))?;
        let page: Page<Track> = self.fetch_as(&endpoint).await?;
        Ok(page.data)
    }

    pub async fn get_artist_albums(&self, id: &str, limit: Option<u32>) -> Result<Vec<Album>> {
        let endpoint = Endpoint::artist_albums(id, self.limit_or_default(limit))?;
        let page: Page<Album> = self.fetch_as(&endpoint).await?;
        Ok(page.data)
    }

    /// Current chart. Falls back to built-in data when the catalog is down.
    pub async fn get_chart(&self) -> Result<Chart> {
        self.fetch_as(&Endpoint::Chart).await
    }

    /// Genre list. Falls back to built-in data when the catalog is down.
    pub async fn get_genres(&self) -> Result<Vec<Genre>> {
        let page: Page<Genre> = self.fetch_as(&Endpoint::Genres).await?;
        Ok(page.data)
    }

    pub async fn get_genre_artists(&self, id: &str, limit: Option<u32>) -> Result<Vec<Artist>> {
        let endpoint = Endpoint::genre_artists(id, self.limit_or_default(limit))?;
        let page: Page<Artist> = self.fetch_as(&endpoint).await?;
        Ok(page.data)
    }

    pub async fn get_genre_tracks(&self, id: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        let endpoint = Endpoint::genre_tracks(id, self.limit_or_default(limit))?;
        let page: Page<Track> = self.fetch_as(&endpoint).await?;
        Ok(page.data)
    }

    /// A chart track picked uniformly among those with a preview URL.
    pub async fn get_random_track(&self) -> Result<Track> {
        let chart = self.get_chart().await?;
        let playable: Vec<&Track> = chart.tracks.data.iter().filter(|t| t.has_preview()).collect();

        playable
            .choose(&mut rand::thread_rng())
            .map(|track| (*track).clone())
            .ok_or(CatalogError::NoPlayableTrack)
    }

    /// Loosely-typed entry point returning the raw payload.
    ///
    /// `params` is a JSON object; see [`Endpoint::from_params`].
    pub async fn fetch_endpoint(&self, kind: EndpointKind, params: &Value) -> Result<Value> {
        let endpoint = Endpoint::from_params(kind, params, self.inner.default_limit)?;
        self.fetch(&endpoint).await
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    /// Drops every cached response and returns how many there were.
    pub fn clear_cache(&self) -> usize {
        let entries = self.inner.cache.clear();
        info!(entries, "Catalog cache cleared");
        self.emit(CatalogEvent::CacheCleared { entries });
        entries
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn limit_or_default(&self, limit: Option<u32>) -> u32 {
        limit.unwrap_or(self.inner.default_limit)
    }

    async fn fetch_as<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let payload = self.fetch(endpoint).await?;
        serde_json::from_value(payload).map_err(|e| CatalogError::Decode {
            endpoint: endpoint.cache_key(),
            message: e.to_string(),
        })
    }

    /// Cache, then shared in-flight request, then degradation.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<Value> {
        let key = endpoint.cache_key();

        if let Some(hit) = self.inner.cache.get(&key) {
            debug!(key = %key, "Catalog cache hit");
            return Ok(hit);
        }

        let request = {
            let mut in_flight = self.inner.in_flight.lock();

            // A request may have settled between the first check and the lock.
            if let Some(hit) = self.inner.cache.get(&key) {
                debug!(key = %key, "Catalog cache hit");
                return Ok(hit);
            }

            match in_flight.get(&key) {
                Some(request) => {
                    debug!(key = %key, "Joining in-flight catalog request");
                    request.clone()
                }
                None => {
                    let request = Self::start_request(
                        Arc::clone(&self.inner),
                        key.clone(),
                        endpoint.url(&self.inner.base_url),
                    );
                    in_flight.insert(key.clone(), request.clone());
                    request
                }
            }
        };

        match request.await {
            Ok(payload) => Ok(payload),
            Err(failures) => self.degrade(endpoint, key, failures),
        }
    }

    fn start_request(inner: Arc<ClientInner>, key: String, url: Url) -> Shared<FetchFuture> {
        let request = async move {
            let result = inner.chain.fetch(&url).await;
            if let Ok(payload) = &result {
                inner.cache.insert(key.clone(), payload.clone());
            }
            inner.in_flight.lock().remove(&key);
            result
        };

        #[cfg(not(target_arch = "wasm32"))]
        let request: FetchFuture = request.boxed();
        #[cfg(target_arch = "wasm32")]
        let request: FetchFuture = request.boxed_local();

        request.shared()
    }

    fn degrade(
        &self,
        endpoint: &Endpoint,
        key: String,
        failures: Vec<AttemptFailure>,
    ) -> Result<Value> {
        if let Some(payload) = fallback::payload_for(endpoint) {
            info!(
                endpoint = %key,
                attempts = failures.len(),
                "All catalog transports failed, serving built-in data"
            );
            self.emit(CatalogEvent::FallbackServed { endpoint: key });
            return Ok(payload);
        }

        error!(
            endpoint = %key,
            attempts = failures.len(),
            failures = ?failures.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Catalog unavailable"
        );
        self.emit(CatalogEvent::Unavailable {
            endpoint: key.clone(),
            attempts: u32::try_from(failures.len()).unwrap_or(u32::MAX),
        });
        Err(CatalogError::Unavailable {
            endpoint: key,
            failures,
        })
    }

    fn emit(&self, event: CatalogEvent) {
        if let Some(bus) = &self.events {
            // No subscribers is not an error.
            let _ = bus.emit(CoreEvent::Catalog(event));
        }
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("chain", &self.inner.chain)
            .field("cache", &self.inner.cache)
            .finish()
    }
}
