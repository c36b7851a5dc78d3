//! Catalog response types
//!
//! Data structures for deserializing catalog API responses. Optional fields
//! default when absent so that slim records (e.g. tracks embedded in an album)
//! decode with the same types as full ones.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque catalog identifier.
///
/// The API sends ids as JSON numbers, while routes and hosts often carry them
/// as strings; both decode to the same decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CatalogId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CatalogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CatalogId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(id) => CatalogId(id.to_string()),
            RawId::Signed(id) => CatalogId(id.to_string()),
            RawId::Text(id) => CatalogId(id),
        })
    }
}

/// Treats `""` the same as a missing value.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Paged list wrapper: `{ "data": [...], "total": n }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: None,
        }
    }
}

/// Artist reference embedded in tracks and albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
}

/// Album reference embedded in tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: CatalogId,
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
}

/// Catalog track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: CatalogId,
    pub title: String,
    #[serde(default)]
    pub title_short: Option<String>,
    pub artist: ArtistRef,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    /// 30-second clip URL; the only audio the player can load.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub preview: Option<String>,
    /// Full track length in seconds
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Track {
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Best available artwork, largest first.
    pub fn artwork(&self) -> Option<&str> {
        let album = self.album.as_ref()?;
        album
            .cover_xl
            .as_deref()
            .or(album.cover_big.as_deref())
            .or(album.cover_medium.as_deref())
            .or(album.cover.as_deref())
    }
}

/// Catalog album
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: CatalogId,
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub nb_tracks: Option<u32>,
    #[serde(default)]
    pub fans: Option<u64>,
    #[serde(default)]
    pub tracks: Page<Track>,
}

impl Album {
    pub fn to_ref(&self) -> AlbumRef {
        AlbumRef {
            id: self.id.clone(),
            title: self.title.clone(),
            cover: self.cover.clone(),
            cover_small: self.cover_small.clone(),
            cover_medium: self.cover_medium.clone(),
            cover_big: self.cover_big.clone(),
            cover_xl: self.cover_xl.clone(),
        }
    }

    /// Embedded tracks omit their album; point them back at this one.
    pub(crate) fn attach_album_to_tracks(&mut self) {
        let album = self.to_ref();
        for track in &mut self.tracks.data {
            if track.album.is_none() {
                track.album = Some(album.clone());
            }
        }
    }
}

/// Catalog artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub picture_big: Option<String>,
    #[serde(default)]
    pub picture_xl: Option<String>,
    #[serde(default)]
    pub nb_album: Option<u32>,
    #[serde(default)]
    pub nb_fan: Option<u64>,
}

/// Catalog genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub picture_big: Option<String>,
}

/// Chart response: top tracks, albums and artists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub tracks: Page<Track>,
    #[serde(default)]
    pub albums: Page<Album>,
    #[serde(default)]
    pub artists: Page<Artist>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_id_accepts_numbers_and_strings() {
        let from_number: CatalogId = serde_json::from_value(json!(3135556)).unwrap();
        let from_string: CatalogId = serde_json::from_value(json!("3135556")).unwrap();
        let negative: CatalogId = serde_json::from_value(json!(-42)).unwrap();

        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "3135556");
        assert_eq!(negative.as_str(), "-42");
        assert_eq!(serde_json::to_value(&from_number).unwrap(), json!("3135556"));
    }

    #[test]
    fn test_track_decodes_with_empty_preview() {
        let track: Track = serde_json::from_value(json!({
            "id": 1,
            "title": "Intro",
            "artist": { "id": 27, "name": "Daft Punk" },
            "preview": "",
            "duration": 224
        }))
        .unwrap();

        assert!(!track.has_preview());
        assert!(track.album.is_none());
        assert_eq!(track.duration, 224);
        assert_eq!(track.artwork(), None);
    }

    #[test]
    fn test_album_fills_embedded_tracks() {
        let mut album: Album = serde_json::from_value(json!({
            "id": 302127,
            "title": "Discovery",
            "cover_medium": "https://cdn.example/discovery-250.jpg",
            "tracks": { "data": [
                { "id": 3135553, "title": "One More Time",
                  "artist": { "id": 27, "name": "Daft Punk" },
                  "preview": "https://cdn.example/p1.mp3" }
            ]}
        }))
        .unwrap();

        album.attach_album_to_tracks();

        let track = &album.tracks.data[0];
        assert_eq!(track.album.as_ref().unwrap().title, "Discovery");
        assert_eq!(track.artwork(), Some("https://cdn.example/discovery-250.jpg"));
    }

    #[test]
    fn test_chart_sections_default_when_missing() {
        let chart: Chart = serde_json::from_value(json!({
            "artists": { "data": [ { "id": 27, "name": "Daft Punk" } ], "total": 1 }
        }))
        .unwrap();

        assert!(chart.tracks.data.is_empty());
        assert_eq!(chart.artists.total, Some(1));
    }
}
