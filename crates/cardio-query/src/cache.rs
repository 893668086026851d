//! Result caches for grouped queries.
//!
//! The table never changes within a process, so entries need no
//! invalidation; size and age bounds only limit memory.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use polars::prelude::DataFrame;

use crate::filter::QueryKey;

/// Storage for query results, injected into [`AnalyticService`](crate::AnalyticService).
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<Arc<DataFrame>>;

    fn insert(&self, key: QueryKey, value: Arc<DataFrame>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

/// Stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl QueryCache for NoCache {
    fn get(&self, _key: &QueryKey) -> Option<Arc<DataFrame>> {
        None
    }

    fn insert(&self, _key: QueryKey, _value: Arc<DataFrame>) {}

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    value: Arc<DataFrame>,
}

/// Least-recently-used cache whose entries also expire `ttl` after insertion.
#[derive(Debug)]
pub struct LruTtlCache {
    entries: Mutex<LruCache<QueryKey, Entry>>,
    ttl: Duration,
}

impl LruTtlCache {
    pub const DEFAULT_CAPACITY: usize = 256;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

    /// A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<QueryKey, Entry>> {
        // Poisoning is ignored: entries are only ever replaced whole.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LruTtlCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL)
    }
}

impl QueryCache for LruTtlCache {
    fn get(&self, key: &QueryKey) -> Option<Arc<DataFrame>> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn insert(&self, key: QueryKey, value: Arc<DataFrame>) {
        self.lock().put(
            key,
            Entry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
