//! Byte-bounded thumbnail cache with a weak second tier
//!
//! Structure:
//! - Primary: `LruCache<String, Entry>` owning strong handles, bounded by total bytes
//! - Secondary: `HashMap<String, WeakThumbnail>` holding non-owning handles to every
//!   value ever put, so an entry evicted from primary can be resurrected while
//!   something else (typically a UI slot) still holds it
//!
//! Invariant: after every public call returns, primary byte total <= `max_bytes`.
//!
//! All operations go through one mutex; they are short and never touch I/O.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};
use lru::LruCache;

use crate::entities::{Thumbnail, WeakThumbnail};

/// Weak handles allowed beyond twice the primary count before a prune sweep
const WEAK_SLACK: usize = 64;

/// Cache statistics for monitoring
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    resurrections: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_resurrection(&self) {
        self.resurrections.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hits served from the weak tier (also counted in `hits`)
    pub fn resurrections(&self) -> u64 {
        self.resurrections.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 { 0.0 } else { self.hits() as f64 / total as f64 }
    }
}

/// Primary-tier entry. `size` is recorded at insertion so accounting stays
/// consistent even if the payload is disposed while cached.
#[derive(Debug)]
struct Entry {
    thumb: Thumbnail,
    size: usize,
}

#[derive(Debug)]
struct Tiers {
    primary: LruCache<String, Entry>,
    secondary: HashMap<String, WeakThumbnail>,
    size: usize,
}

impl Tiers {
    fn remove_primary(&mut self, key: &str) -> Option<Entry> {
        let entry = self.primary.pop(key)?;
        self.size -= entry.size;
        Some(entry)
    }

    /// Insert into primary, replacing any previous value for the key.
    fn insert_primary(&mut self, key: String, thumb: Thumbnail) {
        self.remove_primary(&key);
        let size = thumb.byte_size();
        self.size += size;
        self.primary.push(key, Entry { thumb, size });
    }

    /// Evict least-recently-used entries until the byte total fits.
    fn trim_to(&mut self, max_bytes: usize, stats: &CacheStats) {
        while self.size > max_bytes {
            let Some((key, entry)) = self.primary.pop_lru() else {
                break;
            };
            self.size -= entry.size;
            stats.record_eviction();
            debug!("ImageCache evicted {} ({} bytes, now {} / {})", key, entry.size, self.size, max_bytes);
        }
    }

    /// Drop weak handles whose payload is gone. Sweeps only once the weak tier
    /// outgrows the primary one, so the cost is amortized over many puts.
    fn prune_weak(&mut self) {
        if self.secondary.len() <= self.primary.len() * 2 + WEAK_SLACK {
            return;
        }
        let before = self.secondary.len();
        self.secondary.retain(|_, weak| weak.is_alive());
        trace!("ImageCache pruned {} dead weak entries", before - self.secondary.len());
    }
}

/// Size-bounded cache mapping opaque keys to decoded thumbnails
#[derive(Debug)]
pub struct ImageCache {
    tiers: Mutex<Tiers>,
    max_bytes: usize,
    stats: CacheStats,
}

impl ImageCache {
    /// Create cache with a byte budget for the primary tier
    pub fn new(max_bytes: usize) -> Self {
        debug!("ImageCache created: max {} bytes", max_bytes);
        Self {
            tiers: Mutex::new(Tiers {
                primary: LruCache::unbounded(),
                secondary: HashMap::new(),
                size: 0,
            }),
            max_bytes,
            stats: CacheStats::new(),
        }
    }

    /// Look up `key`.
    ///
    /// A primary hit refreshes LRU order. A disposed primary value is purged and
    /// reported absent. On a primary miss the weak tier is consulted; a live value
    /// there is promoted back into primary (which may evict others).
    pub fn get(&self, key: &str) -> Option<Thumbnail> {
        let mut tiers = self.tiers.lock().unwrap_or_else(|e| e.into_inner());

        let cached = tiers.primary.get(key).map(|entry| entry.thumb.clone());
        if let Some(thumb) = cached {
            if !thumb.is_disposed() {
                self.stats.record_hit();
                return Some(thumb);
            }
            trace!("ImageCache dropping disposed entry {}", key);
            tiers.remove_primary(key);
            tiers.secondary.remove(key);
            self.stats.record_miss();
            return None;
        }

        let alive = tiers.secondary.get(key).and_then(|weak| weak.upgrade());
        match alive {
            Some(thumb) if !thumb.is_disposed() => {
                debug!("ImageCache resurrected {} from weak tier", key);
                tiers.insert_primary(key.to_string(), thumb.clone());
                tiers.trim_to(self.max_bytes, &self.stats);
                self.stats.record_hit();
                self.stats.record_resurrection();
                Some(thumb)
            }
            _ => {
                if tiers.secondary.remove(key).is_some() {
                    trace!("ImageCache purged stale weak entry {}", key);
                }
                self.stats.record_miss();
                None
            }
        }
    }

    /// Insert `thumb` under `key` in both tiers, then evict down to the budget.
    pub fn put(&self, key: &str, thumb: Thumbnail) {
        let mut tiers = self.tiers.lock().unwrap_or_else(|e| e.into_inner());
        tiers.secondary.insert(key.to_string(), thumb.downgrade());
        tiers.insert_primary(key.to_string(), thumb);
        tiers.trim_to(self.max_bytes, &self.stats);
        tiers.prune_weak();
        trace!("ImageCache put {} (now {} bytes)", key, tiers.size);
    }

    /// Explicit invalidation of one key in both tiers
    pub fn remove(&self, key: &str) -> Option<Thumbnail> {
        let mut tiers = self.tiers.lock().unwrap_or_else(|e| e.into_inner());
        tiers.secondary.remove(key);
        tiers.remove_primary(key).map(|entry| entry.thumb)
    }

    /// Drop every entry in both tiers
    pub fn clear(&self) {
        let mut tiers = self.tiers.lock().unwrap_or_else(|e| e.into_inner());
        tiers.primary.clear();
        tiers.secondary.clear();
        tiers.size = 0;
        debug!("ImageCache cleared");
    }

    /// Byte total of the primary tier
    pub fn approximate_size(&self) -> usize {
        self.tiers.lock().unwrap_or_else(|e| e.into_inner()).size
    }

    /// Number of primary entries
    pub fn len(&self) -> usize {
        self.tiers.lock().unwrap_or_else(|e| e.into_inner()).primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Primary membership without touching LRU order or the weak tier
    pub fn contains(&self, key: &str) -> bool {
        self.tiers.lock().unwrap_or_else(|e| e.into_inner()).primary.contains(key)
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
