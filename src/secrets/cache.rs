//! TTL cache for fetched secret values.
//!
//! Expiry is checked on read only. Stale entries stay in the map until they
//! are overwritten by the next successful fetch or dropped by `clear`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A cached secret value and the instant it stops being usable.
#[derive(Clone)]
struct SecretEntry {
    name: String,
    value: String,
    expires_at: Instant,
}

impl SecretEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory map from secret name to its latest fetched value.
#[derive(Default)]
pub struct SecretCache {
    entries: RwLock<HashMap<String, SecretEntry>>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if it has not expired.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .read()
            .get(name)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite `name`, expiring `ttl` from now.
    pub fn put(&self, name: &str, value: String, ttl: Duration) {
        let entry = SecretEntry {
            name: name.to_string(),
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(entry.name.clone(), entry);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of entries held, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
