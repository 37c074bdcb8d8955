//! TTL cache implementation
//!
//! A `HashMap` behind one `RwLock`. Reads take the read lock and treat expired
//! entries as missing without removing them; a background task started at
//! construction sweeps expired entries under the write lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between background sweeps unless configured otherwise
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Cap on how far ahead a deadline may lie (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + delay`, clamped so an oversized delay never overflows the clock
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

/// A cache entry with its expiry deadline
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When this entry stops being served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create an entry that expires `ttl` from now
    pub fn new(value: V, ttl: Duration) -> Self {
        Self { value, expires_at: deadline_after(ttl) }
    }

    /// Check if this entry is expired
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

type Entries<K, V> = Arc<RwLock<HashMap<K, CacheEntry<V>>>>;

/// Thread-safe TTL cache
///
/// A zero TTL disables the cache: `get` always misses and `set` is a no-op,
/// so callers never need to branch on whether caching is on.
///
/// Must be constructed inside a Tokio runtime when the TTL is non-zero, since
/// the sweep runs as a spawned task. The task stops on [`TtlCache::close`] or
/// when the cache is dropped.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Entries<K, V>,
    cleanup_task: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache sweeping every [`DEFAULT_CLEANUP_INTERVAL`]
    pub fn new(ttl: Duration) -> Self {
        Self::with_cleanup_interval(ttl, DEFAULT_CLEANUP_INTERVAL)
    }

    /// Create a cache with a custom sweep interval
    ///
    /// A zero interval falls back to [`DEFAULT_CLEANUP_INTERVAL`].
    pub fn with_cleanup_interval(ttl: Duration, cleanup_interval: Duration) -> Self {
        let entries: Entries<K, V> = Arc::new(RwLock::new(HashMap::new()));

        let cleanup_interval = if cleanup_interval.is_zero() {
            log::warn!(
                "Cache cleanup interval must be positive, using {}s",
                DEFAULT_CLEANUP_INTERVAL.as_secs()
            );
            DEFAULT_CLEANUP_INTERVAL
        } else {
            cleanup_interval.min(FAR_FUTURE)
        };

        let cleanup_task = if ttl.is_zero() {
            None
        } else {
            let sweep_entries = Arc::clone(&entries);
            Some(tokio::spawn(async move {
                let start = deadline_after(cleanup_interval);
                let mut interval_timer = tokio::time::interval_at(start, cleanup_interval);
                loop {
                    interval_timer.tick().await;

                    let removed = remove_expired(&sweep_entries);
                    if removed > 0 {
                        log::debug!("Swept {} expired cache entries", removed);
                    }
                }
            }))
        };

        Self { ttl, entries, cleanup_task: Mutex::new(cleanup_task) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Get a live value, `None` if absent, expired or the cache is disabled
    pub fn get(&self, key: &K) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Store or overwrite a value, expiring `ttl` from now
    pub fn set(&self, key: K, value: V) {
        if !self.is_enabled() {
            return;
        }

        self.write().insert(key, CacheEntry::new(value, self.ttl));
    }

    /// Invalidate one key
    pub fn delete(&self, key: &K) {
        self.write().remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries now, returning how many were removed
    pub fn sweep(&self) -> usize {
        remove_expired(&self.entries)
    }

    /// Stop the background sweep. Calling it again has no effect.
    pub fn close(&self) {
        let task = self.cleanup_task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.abort();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_expired<K, V>(entries: &RwLock<HashMap<K, CacheEntry<V>>>) -> usize
where
    K: Hash + Eq,
{
    let mut entries = entries.write().unwrap_or_else(PoisonError::into_inner);
    let initial_count = entries.len();
    entries.retain(|_, entry| !entry.is_expired());
    initial_count - entries.len()
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        // Abort the sweep when the cache goes away
        let task = self.cleanup_task.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.abort();
        }
    }
}
