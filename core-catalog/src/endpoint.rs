//! Catalog endpoints
//!
//! An [`Endpoint`] is a validated request: building one is the only place
//! parameters are checked, so nothing reaches a transport with a missing id or
//! an empty query. Each endpoint knows its request URL and its cache key.
//!
//! | Endpoint | Path | Cache key |
//! |---|---|---|
//! | search | `/search?q&index&limit` | `search:{q}:{index}:{limit}` |
//! | track | `/track/{id}` | `track:{id}` |
//! | album | `/album/{id}` | `album:{id}` |
//! | artist | `/artist/{id}` | `artist:{id}` |
//! | artist top tracks | `/artist/{id}/top?limit` | `artist-top:{id}:{limit}` |
//! | artist albums | `/artist/{id}/albums?limit` | `artist-albums:{id}:{limit}` |
//! | chart | `/chart` | `charts` |
//! | genres | `/genre` | `genres` |
//! | genre artists | `/genre/{id}/artists?limit` | `genre-artists:{id}:{limit}` |
//! | genre tracks | `/chart/{id}/tracks?limit` | `genre-tracks:{id}:{limit}` |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::error::{CatalogError, Result};
use core_runtime::config::MAX_PAGE_SIZE;

/// Endpoint family, used by the loosely-typed entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointKind {
    Search,
    Track,
    Album,
    Artist,
    ArtistTopTracks,
    ArtistAlbums,
    Chart,
    Genres,
    GenreArtists,
    GenreTracks,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Search => "search",
            EndpointKind::Track => "track",
            EndpointKind::Album => "album",
            EndpointKind::Artist => "artist",
            EndpointKind::ArtistTopTracks => "artist-top-tracks",
            EndpointKind::ArtistAlbums => "artist-albums",
            EndpointKind::Chart => "chart",
            EndpointKind::Genres => "genres",
            EndpointKind::GenreArtists => "genre-artists",
            EndpointKind::GenreTracks => "genre-tracks",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search { query: String, index: u32, limit: u32 },
    Track { id: String },
    Album { id: String },
    Artist { id: String },
    ArtistTopTracks { id: String, limit: u32 },
    ArtistAlbums { id: String, limit: u32 },
    Chart,
    Genres,
    GenreArtists { id: String, limit: u32 },
    GenreTracks { id: String, limit: u32 },
}

impl Endpoint {
    pub fn search(query: &str, index: u32, limit: u32) -> Result<Self> {
        Ok(Endpoint::Search {
            query: normalize_query(query)?,
            index,
            limit: check_limit(limit)?,
        })
    }

    pub fn track(id: &str) -> Result<Self> {
        Ok(Endpoint::Track {
            id: normalize_id("id", id)?,
        })
    }

    pub fn album(id: &str) -> Result<Self> {
        Ok(Endpoint::Album {
            id: normalize_id("id", id)?,
        })
    }

    pub fn artist(id: &str) -> Result<Self> {
        Ok(Endpoint::Artist {
            id: normalize_id("id", id)?,
        })
    }

    pub fn artist_top_tracks(id: &str, limit: u32) -> Result<Self> {
        Ok(Endpoint::ArtistTopTracks {
            id: normalize_id("id", id)?,
            limit: check_limit(limit)?,
        })
    }

    pub fn artist_albums(id: &str, limit: u32) -> Result<Self> {
        Ok(Endpoint::ArtistAlbums {
            id: normalize_id("id", id)?,
            limit: check_limit(limit)?,
        })
    }

    pub fn genre_artists(id: &str, limit: u32) -> Result<Self> {
        Ok(Endpoint::GenreArtists {
            id: normalize_id("id", id)?,
            limit: check_limit(limit)?,
        })
    }

    pub fn genre_tracks(id: &str, limit: u32) -> Result<Self> {
        Ok(Endpoint::GenreTracks {
            id: normalize_id("id", id)?,
            limit: check_limit(limit)?,
        })
    }

    /// Build an endpoint from a JSON parameter object.
    ///
    /// Recognised keys: `query` (search), `id`, `limit`, `index`. Ids may be
    /// strings or non-negative integers; `limit` defaults to `default_limit`
    /// and `index` to 0.
    pub fn from_params(kind: EndpointKind, params: &Value, default_limit: u32) -> Result<Self> {
        if !params.is_null() && !params.is_object() {
            return Err(CatalogError::validation(
                "params",
                "must be a JSON object",
            ));
        }

        let limit = || -> Result<u32> {
            match params.get("limit") {
                None | Some(Value::Null) => Ok(default_limit),
                Some(value) => value_to_u32("limit", value),
            }
        };
        let id = || -> Result<String> { value_to_id(params.get("id")) };

        match kind {
            EndpointKind::Search => {
                let query = match params.get("query") {
                    Some(Value::String(query)) => query.as_str(),
                    None | Some(Value::Null) => {
                        return Err(CatalogError::validation("query", "is required"))
                    }
                    Some(_) => return Err(CatalogError::validation("query", "must be a string")),
                };
                let index = match params.get("index") {
                    None | Some(Value::Null) => 0,
                    Some(value) => value_to_u32("index", value)?,
                };
                Endpoint::search(query, index, limit()?)
            }
            EndpointKind::Track => Ok(Endpoint::Track { id: id()? }),
            EndpointKind::Album => Ok(Endpoint::Album { id: id()? }),
            EndpointKind::Artist => Ok(Endpoint::Artist { id: id()? }),
            EndpointKind::ArtistTopTracks => Endpoint::artist_top_tracks(&id()?, limit()?),
            EndpointKind::ArtistAlbums => Endpoint::artist_albums(&id()?, limit()?),
            EndpointKind::Chart => Ok(Endpoint::Chart),
            EndpointKind::Genres => Ok(Endpoint::Genres),
            EndpointKind::GenreArtists => Endpoint::genre_artists(&id()?, limit()?),
            EndpointKind::GenreTracks => Endpoint::genre_tracks(&id()?, limit()?),
        }
    }

    pub fn kind(&self) -> EndpointKind {
        match self {
            Endpoint::Search { .. } => EndpointKind::Search,
            Endpoint::Track { .. } => EndpointKind::Track,
            Endpoint::Album { .. } => EndpointKind::Album,
            Endpoint::Artist { .. } => EndpointKind::Artist,
            Endpoint::ArtistTopTracks { .. } => EndpointKind::ArtistTopTracks,
            Endpoint::ArtistAlbums { .. } => EndpointKind::ArtistAlbums,
            Endpoint::Chart => EndpointKind::Chart,
            Endpoint::Genres => EndpointKind::Genres,
            Endpoint::GenreArtists { .. } => EndpointKind::GenreArtists,
            Endpoint::GenreTracks { .. } => EndpointKind::GenreTracks,
        }
    }

    /// Deterministic key for the response cache.
    pub fn cache_key(&self) -> String {
        match self {
            Endpoint::Search {
                query,
                index,
                limit,
            } => format!("search:{}:{}:{}", query, index, limit),
            Endpoint::Track { id } => format!("track:{}", id),
            Endpoint::Album { id } => format!("album:{}", id),
            Endpoint::Artist { id } => format!("artist:{}", id),
            Endpoint::ArtistTopTracks { id, limit } => format!("artist-top:{}:{}", id, limit),
            Endpoint::ArtistAlbums { id, limit } => format!("artist-albums:{}:{}", id, limit),
            Endpoint::Chart => "charts".to_string(),
            Endpoint::Genres => "genres".to_string(),
            Endpoint::GenreArtists { id, limit } => format!("genre-artists:{}:{}", id, limit),
            Endpoint::GenreTracks { id, limit } => format!("genre-tracks:{}:{}", id, limit),
        }
    }

    /// Whether built-in data exists for when every transport fails.
    pub fn has_fallback(&self) -> bool {
        matches!(self, Endpoint::Chart | Endpoint::Genres)
    }

    fn path_segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Search { .. } => vec!["search"],
            Endpoint::Track { id } => vec!["track", id],
            Endpoint::Album { id } => vec!["album", id],
            Endpoint::Artist { id } => vec!["artist", id],
            Endpoint::ArtistTopTracks { id, .. } => vec!["artist", id, "top"],
            Endpoint::ArtistAlbums { id, .. } => vec!["artist", id, "albums"],
            Endpoint::Chart => vec!["chart"],
            Endpoint::Genres => vec!["genre"],
            Endpoint::GenreArtists { id, .. } => vec!["genre", id, "artists"],
            Endpoint::GenreTracks { id, .. } => vec!["chart", id, "tracks"],
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Search {
                query,
                index,
                limit,
            } => vec![
                ("q", query.clone()),
                ("index", index.to_string()),
                ("limit", limit.to_string()),
            ],
            Endpoint::ArtistTopTracks { limit, .. }
            | Endpoint::ArtistAlbums { limit, .. }
            | Endpoint::GenreArtists { limit, .. }
            | Endpoint::GenreTracks { limit, .. } => vec![("limit", limit.to_string())],
            _ => Vec::new(),
        }
    }

    /// Request URL relative to the API origin `base`.
    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(self.path_segments());
        }

        let pairs = self.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

fn normalize_query(query: &str) -> Result<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CatalogError::validation("query", "must not be empty"));
    }
    Ok(query.to_string())
}

fn normalize_id(param: &'static str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CatalogError::validation(param, "must not be empty"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CatalogError::validation(
            param,
            format!("'{}' is not a catalog id", id),
        ));
    }
    Ok(id.to_string())
}

fn check_limit(limit: u32) -> Result<u32> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(CatalogError::validation(
            "limit",
            format!("must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }
    Ok(limit)
}

fn value_to_id(value: Option<&Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(CatalogError::validation("id", "is required")),
        Some(Value::String(id)) => normalize_id("id", id),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(id) => Ok(id.to_string()),
            None => Err(CatalogError::validation(
                "id",
                "must be a non-negative integer or a string",
            )),
        },
        Some(_) => Err(CatalogError::validation(
            "id",
            "must be a non-negative integer or a string",
        )),
    }
}

fn value_to_u32(param: &'static str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CatalogError::validation(param, "must be a non-negative integer"))
}
