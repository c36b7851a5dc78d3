//! Time-boxed response cache
//!
//! Entries are valid while `now - stored_at < ttl`. Expired entries stay in
//! the map until the next successful fetch overwrites them; they are never
//! served. Only successful payloads are ever inserted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::time::Clock;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at_ms: i64,
}

/// Snapshot of the cache contents for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries, including expired ones not yet replaced
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
}

pub struct ResponseCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the payload stored under `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.unix_timestamp_millis();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_sub(entry.stored_at_ms) < ttl_ms {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Stores `payload`, replacing any previous entry for `key`.
    pub fn insert(&self, key: impl Into<String>, payload: Value) {
        let entry = CacheEntry {
            payload,
            stored_at_ms: self.clock.unix_timestamp_millis(),
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("size", &self.entries.lock().len())
            .finish()
    }
}
