//! In-memory TTL cache for citation counts.
//!
//! Keys are the exact Scholar endpoint URL; values are counts stamped with
//! the time they were fetched. The cache lives exactly as long as the
//! process; nothing persists across restarts. Expired entries are removed
//! lazily: on the [`get`](CitationCache::get) that finds them stale, and by
//! the opportunistic [`sweep_expired`](CitationCache::sweep_expired) pass
//! the fetch service runs after each insert.
//!
//! The clock is constructor-injected so TTL boundaries are testable without
//! sleeping. Only successful lookups are cached; failures are never stored
//! (a transient outage must not pin "unavailable" for an hour).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default entry time-to-live: 1 hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Time source for cache stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock, used everywhere outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    count: u32,
    fetched_at: Instant,
}

/// Thread-safe TTL cache mapping Scholar URLs to citation counts.
pub struct CitationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for CitationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl CitationCache {
    /// Create a cache with the given TTL and the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a count by endpoint URL.
    ///
    /// Returns `Some(count)` while the entry is younger than the TTL. A
    /// stale entry is evicted on the way out and reported as a miss.
    pub fn get(&self, key: &str) -> Option<u32> {
        if let Some(entry) = self.entries.get(key) {
            let age = self.clock.now().duration_since(entry.fetched_at);
            if age < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key, count = entry.count, "cache hit");
                return Some(entry.count);
            }
            drop(entry);
            self.entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key, "cache miss");
        None
    }

    /// Store a count, stamped with the clock's now. Overwrites any previous
    /// entry for the same URL.
    pub fn insert(&self, key: impl Into<String>, count: u32) {
        let key = key.into();
        tracing::trace!(key = %key, count, "cache insert");
        self.entries.insert(
            key,
            CacheEntry {
                count,
                fetched_at: self.clock.now(),
            },
        );
    }

    /// Remove every entry whose age has reached the TTL. Returns how many
    /// were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.fetched_at) < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of live or stale entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cache hits since creation.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of cache misses since creation.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for CitationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}
