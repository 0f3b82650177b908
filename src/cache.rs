//! In-memory TTL cache for GET responses, backed by `DashMap`.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// A single cached response body with its expiration time.
#[derive(Debug)]
struct CachedResponse {
    body: Value,
    expires_at: Instant,
}

/// Thread-safe response cache with time-to-live expiration.
///
/// Keys are full request URLs; values are parsed JSON bodies. Expired
/// entries are lazily evicted on the next `get` for that key.
#[derive(Debug)]
pub struct ResponseCache {
    store: DashMap<String, CachedResponse>,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates a new cache with the given time-to-live for entries.
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached body for `url`, or `None` if missing or expired.
    pub fn get(&self, url: &str) -> Option<Value> {
        let entry = self.store.get(url)?;
        if Instant::now() > entry.expires_at {
            drop(entry);
            self.store.remove(url);
            return None;
        }
        Some(entry.body.clone())
    }

    /// Inserts or overwrites an entry. The entry expires after the configured TTL.
    pub fn set(&self, url: String, body: Value) {
        self.store.insert(
            url,
            CachedResponse {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.store.clear();
    }
}
