//! Memo of computed charts.
//!
//! Entries are bounded by an LRU limit and age out after a time to live. Memo keys
//! start with the generation of the snapshot a result was computed from, so a swapped
//! snapshot misses even before [`ResultCache::invalidate`] runs.

use std::fmt::{self, Write as _};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;

struct Memo<V> {
    value: V,
    stored: Instant,
}

impl<V> Memo<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored.elapsed() <= ttl
    }
}

type Slots<V> = LruCache<String, Memo<V>>;

/// Shared memo from query keys to results.
///
/// A poisoned lock behaves like an empty memo: lookups miss and stores are dropped.
///
/// # Example
///
/// ```rust
/// use coin_stats_engine::{cache_key, CacheConfig, ResultCache};
///
/// let memo: ResultCache<f64> = ResultCache::new(CacheConfig::default());
/// let key = cache_key(1, &["year", "total", ""]);
///
/// memo.insert(key.clone(), 0.6);
/// assert_eq!(memo.get(&key), Some(0.6));
///
/// memo.invalidate();
/// assert!(memo.get(&key).is_none());
/// ```
pub struct ResultCache<V> {
    slots: Mutex<Slots<V>>,
    ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    /// Creates a memo from the engine cache settings.
    pub fn new(config: CacheConfig) -> Self {
        Self::bounded(config.max_entries, config.ttl)
    }

    /// Creates a memo holding at most `max_entries` results (at least one) for `ttl`.
    pub fn bounded(max_entries: usize, ttl: Duration) -> Self {
        let limit = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(limit)),
            ttl,
        }
    }

    /// The memoised result for `key`, if one is still fresh.
    ///
    /// A stale entry is dropped on the way out; a fresh one becomes most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let ttl = self.ttl;
        self.locked(|slots| {
            let found = slots
                .get(key)
                .map(|memo| memo.is_fresh(ttl).then(|| memo.value.clone()));
            if let Some(None) = found {
                slots.pop(key);
            }
            found.flatten()
        })
        .flatten()
    }

    /// Memoises a result, pushing out the least recently used one at the limit.
    pub fn insert(&self, key: String, value: V) {
        let memo = Memo {
            value,
            stored: Instant::now(),
        };
        self.locked(|slots| slots.put(key, memo));
    }

    /// Number of memoised results, stale ones included.
    pub fn len(&self) -> usize {
        self.locked(|slots| slots.len()).unwrap_or_default()
    }

    /// Returns true when nothing is memoised.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every result. Run on each snapshot swap.
    pub fn invalidate(&self) {
        self.locked(|slots| slots.clear());
    }

    /// Drops stale results and returns how many went.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        self.locked(|slots| {
            let stale: Vec<String> = slots
                .iter()
                .filter(|(_, memo)| !memo.is_fresh(ttl))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &stale {
                slots.pop(key);
            }
            stale.len()
        })
        .unwrap_or_default()
    }

    /// Counts fresh and stale results.
    pub fn stats(&self) -> CacheStats {
        let ttl = self.ttl;
        self.locked(|slots| {
            slots
                .iter()
                .fold(CacheStats::default(), |mut stats, (_, memo)| {
                    stats.entries += 1;
                    if memo.is_fresh(ttl) {
                        stats.fresh += 1;
                    } else {
                        stats.stale += 1;
                    }
                    stats
                })
        })
        .unwrap_or_default()
    }

    fn locked<R>(&self, f: impl FnOnce(&mut Slots<V>) -> R) -> Option<R> {
        self.slots.lock().ok().map(|mut slots| f(&mut slots))
    }
}

impl<V: Clone> fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Snapshot of the memo's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Results held, fresh or not.
    pub entries: usize,
    /// Results past their time to live but not yet dropped.
    pub stale: usize,
    /// Results still served.
    pub fresh: usize,
}

/// Builds a memo key from a snapshot generation and the query parts.
///
/// Every part is kept verbatim behind its byte length, so two part lists share a key
/// only when they are equal.
pub fn cache_key(generation: u64, parts: &[&str]) -> String {
    parts.iter().fold(generation.to_string(), |mut key, part| {
        // Writing into a String cannot fail.
        let _ = write!(key, "|{}:{part}", part.len());
        key
    })
}
