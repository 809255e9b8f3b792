//! In-memory TTL cache for fetched API payloads
//!
//! Entries are checked lazily on read; nothing is evicted in the background.
//! Two misses on the same key may both fetch, there is no in-flight
//! deduplication.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

/// Source of "now" for freshness checks
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A cached payload and when it was fetched
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Process-local cache keyed by source + query parameters
///
/// The TTL is supplied per call so one cache can serve sources with different
/// freshness windows.
#[derive(Debug)]
pub struct ResponseCache<T, C = SystemClock> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    clock: C,
}

impl<T: Clone> Default for ResponseCache<T, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ResponseCache<T, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<T: Clone, C: Clock> ResponseCache<T, C> {
    /// Creates a cache that reads time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the payload for `key` if it was fetched less than `ttl` ago
    pub fn get(&self, key: &str, ttl: Duration) -> Option<T> {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.payload.clone())
    }

    /// Stores `payload` under `key`, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, payload: T) {
        let entry = CacheEntry {
            payload,
            fetched_at: self.clock.now(),
        };
        self.entries().insert(key.into(), entry);
    }

    /// Returns the cached payload for `key`, or runs `fetch` and caches its result
    ///
    /// # Arguments
    /// * `key` - Composite key identifying the source and query
    /// * `ttl` - How long a fetched payload stays fresh
    /// * `fetch` - Invoked only on a miss or a stale entry
    ///
    /// # Returns
    /// * `Ok(T)` - The cached or freshly fetched payload
    /// * `Err(E)` - The fetch error; nothing is cached in that case
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.get(key, ttl) {
            tracing::debug!(key, "cache hit");
            return Ok(payload);
        }

        tracing::debug!(key, "cache miss");
        let payload = fetch().await?;
        self.insert(key, payload.clone());
        Ok(payload)
    }

    /// Drops the entry for `key` so the next read fetches again
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries().remove(key).is_some()
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
