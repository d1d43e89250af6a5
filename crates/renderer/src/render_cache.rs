//! In-memory LRU cache for rendered frames.
//!
//! Capacity-bounded with lazy TTL expiration on read. A hit refreshes the
//! entry's recency ordering but never its timestamp: only the original
//! computation counts as freshness, so repeated reads cannot extend an
//! entry's lifetime indefinitely.

use crate::key::RenderKey;
use bytes::Bytes;
use lru::LruCache;
use radar_common::{RenderConfig, RenderError, RenderResult};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CachedFrame {
    frame: Bytes,
    rendered_at: Instant,
}

impl CachedFrame {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.rendered_at.elapsed() > ttl
    }
}

/// Statistics for the render cache.
///
/// All fields are atomic for lock-free reads from diagnostics.
#[derive(Debug, Default)]
pub struct RenderCacheStats {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses.
    pub misses: AtomicU64,
    /// Entries evicted by the capacity bound.
    pub evictions: AtomicU64,
    /// Entries dropped on read because their TTL had passed.
    pub expired: AtomicU64,
    /// Stale entries served because `serve_stale` was enabled.
    pub stale_served: AtomicU64,
}

impl RenderCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU+TTL cache of finished RGBA frames.
pub struct RenderCache {
    inner: Mutex<LruCache<RenderKey, CachedFrame>>,
    ttl: Duration,
    serve_stale: bool,
    stats: RenderCacheStats,
}

impl RenderCache {
    /// Create a cache from configuration.
    pub fn new(config: &RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self::with_ttl(
            config.capacity,
            Duration::from_secs(config.ttl_secs),
            config.serve_stale,
        ))
    }

    /// Create a cache with an explicit TTL. Panics if `capacity` is zero;
    /// use [`RenderCache::new`] for validated construction.
    pub fn with_ttl(capacity: usize, ttl: Duration, serve_stale: bool) -> Self {
        let capacity = NonZeroUsize::new(capacity).expect("capacity must be > 0");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            serve_stale,
            stats: RenderCacheStats::default(),
        }
    }

    /// Fetch a frame. Refreshes recency on a hit. An entry past its TTL is
    /// treated as a miss and removed (unless stale serving is enabled).
    pub fn get(&self, key: &RenderKey) -> Option<Bytes> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = inner.get(key) {
            if !entry.is_expired(self.ttl) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.frame.clone());
            }
            if self.serve_stale {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                self.stats.stale_served.fetch_add(1, Ordering::Relaxed);
                return Some(entry.frame.clone());
            }
            inner.pop(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a frame, evicting the least-recently-used entry if the cache
    /// is at capacity.
    pub fn insert(&self, key: RenderKey, frame: Bytes) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((evicted_key, _)) = inner.push(key.clone(), CachedFrame {
            frame,
            rendered_at: Instant::now(),
        }) {
            if evicted_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %evicted_key.fingerprint(), "render cache evicted LRU entry");
            }
        }
    }

    /// Current number of cached frames.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all cached frames.
    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Cache statistics.
    pub fn stats(&self) -> &RenderCacheStats {
        &self.stats
    }
}
