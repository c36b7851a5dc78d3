//! In-memory favorites
//!
//! Tracks, albums and artists the listener has marked. Identity is the pair
//! (catalog id, kind), so a track and an album sharing an id are distinct
//! favorites. Entries keep insertion order and live only as long as the
//! service.

use std::fmt;
use std::sync::Arc;

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_catalog::models::{Album, Artist, CatalogId, Track};
use core_runtime::events::{CoreEvent, EventBus, FavoriteEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Track,
    Album,
    Artist,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteKind::Track => "track",
            FavoriteKind::Album => "album",
            FavoriteKind::Artist => "artist",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets stored when something is marked as a favorite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteItem {
    pub id: CatalogId,
    pub kind: FavoriteKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub artwork: Option<String>,
}

impl From<&Track> for FavoriteItem {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            kind: FavoriteKind::Track,
            title: track.title.clone(),
            subtitle: Some(track.artist.name.clone()),
            artwork: track.artwork().map(str::to_string),
        }
    }
}

impl From<&Album> for FavoriteItem {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id.clone(),
            kind: FavoriteKind::Album,
            title: album.title.clone(),
            subtitle: album.artist.as_ref().map(|artist| artist.name.clone()),
            artwork: album.cover_medium.clone().or_else(|| album.cover.clone()),
        }
    }
}

impl From<&Artist> for FavoriteItem {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id.clone(),
            kind: FavoriteKind::Artist,
            title: artist.name.clone(),
            subtitle: None,
            artwork: artist
                .picture_medium
                .clone()
                .or_else(|| artist.picture.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: CatalogId,
    pub kind: FavoriteKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub artwork: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    fn matches(&self, id: &CatalogId, kind: FavoriteKind) -> bool {
        self.kind == kind && &self.id == id
    }
}

pub struct Favorites {
    entries: Mutex<Vec<Favorite>>,
    clock: Arc<dyn Clock>,
    events: Option<EventBus>,
}

impl Favorites {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            clock,
            events: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Add a favorite. Returns `false` if it was already present.
    pub fn add(&self, item: impl Into<FavoriteItem>) -> bool {
        let item = item.into();
        {
            let mut entries = self.entries.lock();
            if entries.iter().any(|fav| fav.matches(&item.id, item.kind)) {
                return false;
            }
            entries.push(Favorite {
                id: item.id.clone(),
                kind: item.kind,
                title: item.title,
                subtitle: item.subtitle,
                artwork: item.artwork,
                added_at: self.clock.now(),
            });
        }

        debug!(id = %item.id, kind = %item.kind, "Favorite added");
        self.publish(FavoriteEvent::Added {
            id: item.id.to_string(),
            kind: item.kind.to_string(),
        });
        true
    }

    /// Remove a favorite. Returns `false` if it was not present.
    pub fn remove(&self, id: &CatalogId, kind: FavoriteKind) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|fav| !fav.matches(id, kind));
            entries.len() != before
        };

        if removed {
            debug!(%id, %kind, "Favorite removed");
            self.publish(FavoriteEvent::Removed {
                id: id.to_string(),
                kind: kind.to_string(),
            });
        }
        removed
    }

    /// Add the item if absent, remove it otherwise. Returns whether it is a
    /// favorite afterwards.
    pub fn toggle(&self, item: impl Into<FavoriteItem>) -> bool {
        let item = item.into();
        if self.contains(&item.id, item.kind) {
            self.remove(&item.id, item.kind);
            false
        } else {
            self.add(item)
        }
    }

    pub fn contains(&self, id: &CatalogId, kind: FavoriteKind) -> bool {
        self.entries.lock().iter().any(|fav| fav.matches(id, kind))
    }

    /// All favorites, oldest first.
    pub fn list(&self) -> Vec<Favorite> {
        self.entries.lock().clone()
    }

    pub fn list_kind(&self, kind: FavoriteKind) -> Vec<Favorite> {
        self.entries
            .lock()
            .iter()
            .filter(|fav| fav.kind == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, event: FavoriteEvent) {
        if let Some(bus) = &self.events {
            // No subscribers is not an error.
            let _ = bus.emit(CoreEvent::Favorites(event));
        }
    }
}

impl fmt::Debug for Favorites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Favorites")
            .field("len", &self.len())
            .finish()
    }
}
