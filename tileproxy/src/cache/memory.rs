//! Strict LRU memory cache for tile images.
//!
//! Backed by `lru::LruCache` behind a `parking_lot::Mutex`. The lock is
//! only held for map mutation; it is never held across an await point, so
//! unrelated tiles are never serialised behind a network call.
//!
//! Eviction is synchronous with insertion: pushing the entry that exceeds
//! capacity removes exactly the least-recently-used entry, and a `get`
//! refreshes the entry's recency. Capacity is an entry count, sized on the
//! assumption that tiles are roughly uniform in size.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use super::{TileImage, TileKey};

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: usize,
}

/// In-memory LRU cache for tile images.
///
/// Safe for concurrent use; `get` and `insert` take the lock briefly and
/// clone out [`TileImage`] values, which is cheap because the image body
/// is a shared `Bytes`.
pub struct TileCache {
    inner: Mutex<LruCache<TileKey, TileImage>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TileCache {
    /// Creates a cache holding at most `capacity` tiles.
    ///
    /// A capacity of zero is clamped to one entry.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Looks up a tile, refreshing its recency on a hit.
    pub fn get(&self, key: &TileKey) -> Option<TileImage> {
        let result = self.inner.lock().get(key).cloned();
        match result {
            Some(tile) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(tile)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts a tile, evicting the least-recently-used entry if the cache
    /// is at capacity. Replacing an existing key does not count as an
    /// eviction.
    pub fn insert(&self, key: TileKey, tile: TileImage) {
        let evicted = self.inner.lock().push(key.clone(), tile);
        if let Some((old_key, _)) = evicted {
            if old_key != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Whether a key is present, without touching recency.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.inner.lock().contains(key)
    }

    /// Number of entries currently cached.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.entry_count(),
        }
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
