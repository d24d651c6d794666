//! In-memory translation cache with absolute and sliding expiration.
//!
//! An entry is served only while both windows are open: the absolute window
//! starts at insertion and never moves, the sliding window restarts on every
//! hit. Expired entries are dropped on access and by a periodic sweep.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::interface::TranslationResponse;

struct CacheEntry {
    value: TranslationResponse,
    inserted_at: Instant,
    absolute: Duration,
    sliding: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    // Compare elapsed time instead of computing deadlines, so arbitrarily
    // long windows cannot overflow `Instant`.
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.absolute
            || now.saturating_duration_since(self.last_accessed) >= self.sliding
    }
}

pub struct TranslationCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl TranslationCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a live entry, renewing its sliding window.
    ///
    /// The returned copy is marked `from_cache`.
    pub fn get(&self, key: &str) -> Option<TranslationResponse> {
        let now = Instant::now();
        let hit = {
            let mut entry = self.entries.get_mut(key)?;
            if entry.is_expired(now) {
                None
            } else {
                entry.last_accessed = now;
                Some(entry.value.clone())
            }
        };

        match hit {
            Some(mut value) => {
                value.from_cache = true;
                Some(value)
            }
            None => {
                self.entries.remove_if(key, |_, e| e.is_expired(now));
                None
            }
        }
    }

    /// Store `value`, (re)starting both expiration windows.
    pub fn put(&self, key: &str, value: TranslationResponse, absolute: Duration, sliding: Duration) {
        let now = Instant::now();
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room(now);
        }

        let mut value = value;
        value.from_cache = false;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                absolute,
                sliding,
                last_accessed: now,
            },
        );
    }

    /// Number of stored entries, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    fn make_room(&self, now: Instant) {
        self.entries.retain(|_, e| !e.is_expired(now));
        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_accessed)
                .map(|e| e.key().clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting least recently used cache entry: {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Spawn a task that purges expired entries every `period`.
    ///
    /// The task ends once the last strong reference to the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        })
    }
}
