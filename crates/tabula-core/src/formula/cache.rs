//! Formula result cache

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;

use crate::value::Value;

/// Default number of cached formula results
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Cache key: one result per column, row and row version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub column_id: String,
    pub row_id: String,
    pub version: u64,
}

impl CacheKey {
    pub fn new(column_id: impl Into<String>, row_id: impl Into<String>, version: u64) -> Self {
        Self {
            column_id: column_id.into(),
            row_id: row_id.into(),
            version,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries removed by clear or invalidation
    pub invalidations: u64,
    pub entry_count: usize,
    /// Maximum entries, `None` when unbounded
    pub capacity: Option<usize>,
}

impl CacheStats {
    /// Hit ratio in `[0, 1]`, 0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug)]
struct CacheState {
    entries: LruCache<CacheKey, Value>,
    stats: CacheStats,
}

impl CacheState {
    fn refresh_count(&mut self) {
        self.stats.entry_count = self.entries.len();
    }

    fn remove_where(&mut self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let doomed: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.pop(key);
        }
        self.stats.invalidations += doomed.len() as u64;
        self.refresh_count();
        doomed.len()
    }
}

/// In-memory LRU cache of formula results
///
/// Interior mutability lets evaluation take `&self`; a lookup refreshes
/// recency so it needs the lock exclusively.
#[derive(Debug)]
pub struct FormulaCache {
    state: Mutex<CacheState>,
}

impl FormulaCache {
    /// Create a cache holding at most `capacity` results, `0` for unbounded
    pub fn new(capacity: usize) -> Self {
        let (entries, capacity) = match NonZeroUsize::new(capacity) {
            Some(limit) => (LruCache::new(limit), Some(capacity)),
            None => (LruCache::unbounded(), None),
        };

        Self {
            state: Mutex::new(CacheState {
                entries,
                stats: CacheStats {
                    capacity,
                    ..CacheStats::default()
                },
            }),
        }
    }

    /// Look up a result
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut state = self.state.lock();
        match state.entries.get(key).cloned() {
            Some(value) => {
                state.stats.hits += 1;
                Some(value)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Store a result, evicting the least recently used entry when full
    pub fn insert(&self, key: CacheKey, value: Value) {
        let mut state = self.state.lock();
        if let Some((evicted, _)) = state.entries.push(key.clone(), value) {
            // push hands back the old value when the key was already present
            if evicted != key {
                state.stats.evictions += 1;
            }
        }
        state.refresh_count();
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.entries.len() as u64;
        state.entries.clear();
        state.stats.invalidations += dropped;
        state.refresh_count();
    }

    /// Remove all results for a row, returning how many were dropped
    pub fn invalidate_row(&self, row_id: &str) -> usize {
        self.state.lock().remove_where(|key| key.row_id == row_id)
    }

    /// Remove all results for a column, returning how many were dropped
    pub fn invalidate_column(&self, column_id: &str) -> usize {
        self.state.lock().remove_where(|key| key.column_id == column_id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats.clone()
    }
}

impl Default for FormulaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
