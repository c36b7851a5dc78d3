//! Built-in payloads served when the catalog cannot be reached.
//!
//! Shapes match the live responses so they decode through the same models.
//! Fallback tracks carry no preview URL: they keep the home screen populated
//! but are never handed to the player.

use serde_json::{json, Value};

use crate::endpoint::Endpoint;

/// Fallback payload for `endpoint`, if it has one.
pub fn payload_for(endpoint: &Endpoint) -> Option<Value> {
    match endpoint {
        Endpoint::Chart => Some(chart()),
        Endpoint::Genres => Some(genres()),
        _ => None,
    }
}

const GENRES: &[(u64, &str)] = &[
    (0, "All"),
    (132, "Pop"),
    (116, "Rap/Hip Hop"),
    (152, "Rock"),
    (113, "Dance"),
    (165, "R&B"),
    (85, "Alternative"),
    (106, "Electro"),
    (466, "Folk"),
    (144, "Reggae"),
    (129, "Jazz"),
    (98, "Classical"),
];

pub fn genres() -> Value {
    let data: Vec<Value> = GENRES
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name, "type": "genre" }))
        .collect();
    json!({ "data": data })
}

// (track id, title, duration, artist id, artist, album id, album)
const CHART_TRACKS: &[(u64, &str, u32, u64, &str, u64, &str)] = &[
    (3135556, "Harder, Better, Faster, Stronger", 224, 27, "Daft Punk", 302127, "Discovery"),
    (916424, "Without Me", 290, 13, "Eminem", 103248, "The Eminem Show"),
    (1109731, "Lose Yourself", 326, 13, "Eminem", 119606, "8 Mile"),
    (3129407, "Seven Nation Army", 232, 1151, "The White Stripes", 302090, "Elephant"),
    (2114406, "Clocks", 307, 892, "Coldplay", 212377, "A Rush of Blood to the Head"),
];

pub fn chart() -> Value {
    let tracks: Vec<Value> = CHART_TRACKS
        .iter()
        .enumerate()
        .map(|(position, (id, title, duration, artist_id, artist, album_id, album))| {
            json!({
                "id": id,
                "title": title,
                "duration": duration,
                "position": position + 1,
                "preview": "",
                "artist": { "id": artist_id, "name": artist },
                "album": { "id": album_id, "title": album },
                "type": "track",
            })
        })
        .collect();

    let mut albums: Vec<Value> = Vec::new();
    let mut artists: Vec<Value> = Vec::new();
    for (_, _, _, artist_id, artist, album_id, album) in CHART_TRACKS {
        if !albums.iter().any(|a| a["id"] == json!(album_id)) {
            albums.push(json!({
                "id": album_id,
                "title": album,
                "artist": { "id": artist_id, "name": artist },
                "type": "album",
            }));
        }
        if !artists.iter().any(|a| a["id"] == json!(artist_id)) {
            artists.push(json!({ "id": artist_id, "name": artist, "type": "artist" }));
        }
    }

    json!({
        "tracks": { "data": tracks, "total": CHART_TRACKS.len() },
        "albums": { "data": albums, "total": albums.len() },
        "artists": { "data": artists, "total": artists.len() },
    })
}
