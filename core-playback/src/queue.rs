//! Play queue
//!
//! An ordered list of tracks with a cursor. The cursor is `None` only when the
//! queue is empty and otherwise always points inside the list; moving past
//! either end is refused rather than wrapped.

use core_catalog::models::Track;

use crate::error::{PlaybackError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with `list`, positioned on `track`.
    ///
    /// When `track` is not part of `list` it is placed at the front.
    pub fn load(&mut self, track: Track, list: Vec<Track>) {
        match list.iter().position(|t| t.id == track.id) {
            Some(index) => {
                self.tracks = list;
                self.cursor = Some(index);
            }
            None => {
                let mut tracks = Vec::with_capacity(list.len() + 1);
                tracks.push(track);
                tracks.extend(list);
                self.tracks = tracks;
                self.cursor = Some(0);
            }
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.tracks.get(index))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn has_next(&self) -> bool {
        matches!(self.cursor, Some(index) if index + 1 < self.tracks.len())
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.cursor, Some(index) if index > 0)
    }

    /// Move forward one position. Returns `false` at the last track.
    pub fn advance(&mut self) -> bool {
        match self.cursor {
            Some(index) if index + 1 < self.tracks.len() => {
                self.cursor = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    /// Move back one position. Returns `false` at the first track.
    pub fn retreat(&mut self) -> bool {
        match self.cursor {
            Some(index) if index > 0 => {
                self.cursor = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn jump(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::QueueIndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }
}
