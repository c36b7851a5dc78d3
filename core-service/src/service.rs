//! Discovery façade
//!
//! [`DiscoveryService`] owns one catalog client, one playback engine and the
//! favorites store, all publishing on one event bus. Besides exposing them it
//! offers the composite flows a discovery UI needs: open a track together with
//! related tracks, play an album, browse a genre and "surprise me".

use std::sync::Arc;

use bridge_traits::playback::{AudioTransport, DeviceEvent};
use core_catalog::models::{Album, Artist, Track};
use core_catalog::CatalogClient;
use core_playback::{pump_device_events, PlaybackEngine};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus};
use futures::Stream;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::favorites::{FavoriteItem, FavoriteKind, Favorites};

/// Related tracks are drawn from this many of the artist's top tracks.
pub const RELATED_FETCH_LIMIT: u32 = 9;
/// At most this many related tracks are shown next to a track.
pub const RELATED_TRACK_LIMIT: usize = 8;
/// Page size for the genre browse view.
pub const GENRE_PAGE_LIMIT: u32 = 24;

/// A track plus other tracks by the same artist.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDetails {
    pub track: Track,
    pub related: Vec<Track>,
}

impl TrackDetails {
    /// Queue for playing this track: the track itself, then the related ones.
    pub fn queue(&self) -> Vec<Track> {
        std::iter::once(self.track.clone())
            .chain(self.related.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenrePage {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct DiscoveryService {
    catalog: CatalogClient,
    engine: Arc<PlaybackEngine>,
    favorites: Arc<Favorites>,
    events: EventBus,
}

impl DiscoveryService {
    /// Wire the catalog client, the engine and favorites from `config`.
    ///
    /// `audio` becomes the engine's only playback device. Its events still
    /// have to be routed in with [`attach_device_events`](Self::attach_device_events)
    /// or [`PlaybackEngine::handle_device_event`].
    pub fn new(config: &CoreConfig, audio: Arc<dyn AudioTransport>) -> Result<Self> {
        let events = EventBus::new(config.event_bus_capacity);

        let catalog = CatalogClient::from_core_config(config)?.with_event_bus(events.clone());
        let engine = PlaybackEngine::new(audio, &config.player).with_event_bus(events.clone());
        let favorites =
            Favorites::new(Arc::clone(&config.clock)).with_event_bus(events.clone());

        info!(
            script_bridge = config.uses_script_bridge(),
            relays = config.catalog.relays.len(),
            "Discovery service ready"
        );

        Ok(Self {
            catalog,
            engine: Arc::new(engine),
            favorites: Arc::new(favorites),
            events,
        })
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn player(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Drive the engine from `events` on a background task until the stream
    /// ends.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn attach_device_events<S>(&self, events: S)
    where
        S: Stream<Item = DeviceEvent> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        core_async::spawn_detached(async move {
            pump_device_events(&engine, events).await;
        });
    }

    /// Drive the engine from `events` on a background task until the stream
    /// ends.
    #[cfg(target_arch = "wasm32")]
    pub fn attach_device_events<S>(&self, events: S)
    where
        S: Stream<Item = DeviceEvent> + 'static,
    {
        let engine = Arc::clone(&self.engine);
        core_async::spawn_detached(async move {
            pump_device_events(&engine, events).await;
        });
    }

    /// Load a track and up to eight other top tracks by its artist.
    ///
    /// Failing to load related tracks is not an error; the list is empty.
    pub async fn track_details(&self, id: &str) -> Result<TrackDetails> {
        let track = self.catalog.get_track(id).await?;

        let related = match self
            .catalog
            .get_artist_top_tracks(track.artist.id.as_str(), Some(RELATED_FETCH_LIMIT))
            .await
        {
            Ok(tracks) => tracks
                .into_iter()
                .filter(|candidate| candidate.id != track.id)
                .take(RELATED_TRACK_LIMIT)
                .collect(),
            Err(err) => {
                warn!(artist = %track.artist.id, error = %err, "Failed to load related tracks");
                Vec::new()
            }
        };

        Ok(TrackDetails { track, related })
    }

    /// Play a track with its related tracks queued after it.
    pub async fn play_track(&self, id: &str) -> Result<TrackDetails> {
        let details = self.track_details(id).await?;
        self.engine.play(details.track.clone(), details.queue());
        Ok(details)
    }

    /// Play an album from `start_track` (or its first track).
    pub async fn play_album(&self, id: &str, start_track: Option<&str>) -> Result<Album> {
        let album = self.catalog.get_album(id).await?;
        let tracks = album.tracks.data.clone();

        let start = start_track
            .and_then(|wanted| tracks.iter().find(|track| track.id.as_str() == wanted))
            .or_else(|| tracks.first())
            .cloned()
            .ok_or_else(|| CoreError::NothingToPlay(format!("album {}", album.id)))?;

        self.engine.play(start, tracks);
        Ok(album)
    }

    /// Top tracks and artists of a genre, fetched concurrently.
    pub async fn genre_page(&self, id: &str) -> Result<GenrePage> {
        let (tracks, artists) = futures::join!(
            self.catalog.get_genre_tracks(id, Some(GENRE_PAGE_LIMIT)),
            self.catalog.get_genre_artists(id, Some(GENRE_PAGE_LIMIT)),
        );

        Ok(GenrePage {
            tracks: tracks?,
            artists: artists?,
        })
    }

    /// Play one random previewable chart track on its own.
    pub async fn surprise_me(&self) -> Result<Track> {
        let track = self.catalog.get_random_track().await?;
        info!(track_id = %track.id, "Surprise pick");
        self.engine.play(track.clone(), vec![track.clone()]);
        Ok(track)
    }

    /// Toggle the currently playing track as a favorite.
    ///
    /// Returns `None` when nothing is loaded, otherwise whether the track is a
    /// favorite afterwards.
    pub fn toggle_current_favorite(&self) -> Option<bool> {
        let track = self.engine.snapshot().current_track?;
        Some(self.favorites.toggle(FavoriteItem::from(&track)))
    }

    pub fn is_favorite_track(&self, track: &Track) -> bool {
        self.favorites.contains(&track.id, FavoriteKind::Track)
    }
}

impl std::fmt::Debug for DiscoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("catalog", &self.catalog)
            .field("status", &self.engine.status())
            .field("favorites", &self.favorites.len())
            .finish()
    }
}
