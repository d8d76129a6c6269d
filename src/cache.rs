use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

/// In-memory cache with a fixed time-to-live per entry.
/// Keys are normalized (trimmed, lowercased, collapsed whitespace) before lookup.
pub struct TtlCache<V> {
    entries: HashMap<String, (Instant, V)>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: HashMap::new(), ttl }
    }

    /// Returns a clone of the cached value, dropping it first if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let key = normalize_key(key);
        let (stored_at, value) = self.entries.get(&key)?;
        if stored_at.elapsed() < self.ttl {
            debug!("Cache hit for '{}'", key);
            return Some(value.clone());
        }
        debug!("Cache entry for '{}' expired", key);
        self.entries.remove(&key);
        None
    }

    pub fn insert(&mut self, key: &str, value: V) {
        self.entries.insert(normalize_key(key), (Instant::now(), value));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}
