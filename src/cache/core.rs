use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::json;

use crate::logging::{LogLevel, Logger, event_with_fields, json_kv, json_str};

const LOG_TARGET: &str = "canvas::cache";

pub fn widget_key(widget_id: &str, name: &str) -> String {
    format!("widget:{widget_id}:{name}")
}

pub fn layout_key(page_id: &str, rows: u32, cols: u32) -> String {
    format!("layout:{page_id}:{rows}x{cols}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }
}

/// Shared memo table keyed by string.
///
/// Safe to share across threads: each key has its own writer lock so at
/// most one caller recomputes a given key at a time, while lookups of other
/// keys proceed. Expired entries are swept whenever a new value is stored,
/// and a key's writer lock is dropped once nobody is waiting on it.
pub struct ComputationCache<V> {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    writers: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    logger: Option<Logger>,
}

impl<V: Clone> ComputationCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: Mutex::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the cached value for `key`, computing and storing it when
    /// absent or older than `ttl`.
    pub fn get_or_compute<F>(&self, key: &str, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        let writer = self.writer_for(key);
        let write_guard = lock(&writer);

        // Another writer may have filled the slot while we waited.
        let value = match self.lookup(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                value
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let value = compute();
                self.store(key, value.clone(), ttl);
                value
            }
        };

        drop(write_guard);
        self.release_writer(key, &writer);
        value
    }

    fn store(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = lock(&self.entries);
        entries.retain(|_, entry| entry.is_fresh(now));
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.lookup(key)
    }

    /// Memoises a per-widget calculation under `widget:{id}:{name}`.
    pub fn cache_widget_calculation<F>(
        &self,
        widget_id: &str,
        name: &str,
        ttl: Duration,
        compute: F,
    ) -> V
    where
        F: FnOnce() -> V,
    {
        self.get_or_compute(&widget_key(widget_id, name), ttl, compute)
    }

    /// Memoises a page layout under `layout:{page}:{rows}x{cols}` using the
    /// cache's default TTL.
    pub fn cache_grid_layout<F>(&self, page_id: &str, rows: u32, cols: u32, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.get_or_compute(&layout_key(page_id, rows, cols), self.default_ttl, compute)
    }

    /// Writer locks are left alone so an in-flight compute keeps excluding
    /// other writers of the same key.
    pub fn invalidate(&self, key: &str) -> bool {
        lock(&self.entries).remove(key).is_some()
    }

    /// Drops every entry whose key starts with `prefix`; returns how many.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = {
            let mut entries = lock(&self.entries);
            let before = entries.len();
            entries.retain(|key, _| !key.starts_with(prefix));
            before - entries.len()
        };
        self.log_invalidation(prefix, removed);
        removed
    }

    pub fn invalidate_widget_calculations(&self, widget_id: &str) -> usize {
        self.invalidate_prefix(&format!("widget:{widget_id}:"))
    }

    pub fn invalidate_page_layouts(&self, page_id: &str) -> usize {
        self.invalidate_prefix(&format!("layout:{page_id}:"))
    }

    /// Removes expired entries; lookups already ignore them.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: lock(&self.entries).len(),
        }
    }

    fn lookup(&self, key: &str) -> Option<V> {
        let entries = lock(&self.entries);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn writer_for(&self, key: &str) -> Arc<Mutex<()>> {
        lock(&self.writers)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forgets the writer lock for `key` when only the map and `writer`
    /// still reference it. Clones are only handed out under the `writers`
    /// lock, so the count cannot grow while it is checked.
    fn release_writer(&self, key: &str, writer: &Arc<Mutex<()>>) {
        let mut writers = lock(&self.writers);
        let idle = writers.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, writer) && Arc::strong_count(writer) == 2
        });
        if idle {
            writers.remove(key);
        }
    }

    #[cfg(test)]
    fn writer_count(&self) -> usize {
        lock(&self.writers).len()
    }

    fn log_invalidation(&self, prefix: &str, removed: usize) {
        if let Some(logger) = &self.logger {
            let event = event_with_fields(
                LogLevel::Debug,
                LOG_TARGET,
                "cache.invalidated",
                [json_str("prefix", prefix), json_kv("removed", json!(removed))],
            );
            let _ = logger.log_event(event);
        }
    }
}

/// Cached values are plain data, so a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;

    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn second_lookup_hits() {
        let cache = ComputationCache::new(LONG);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        };
        assert_eq!(cache.get_or_compute("k", LONG, compute), 42);
        assert_eq!(cache.get_or_compute("k", LONG, compute), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                size: 1
            }
        );
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[test]
    fn zero_ttl_always_recomputes() {
        let cache = ComputationCache::new(LONG);
        let mut next = 0;
        for expected in 1..=3 {
            let value = cache.get_or_compute("k", Duration::ZERO, || {
                next += 1;
                next
            });
            assert_eq!(value, expected);
        }
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn widget_invalidation_is_scoped_by_prefix() {
        let cache = ComputationCache::new(LONG);
        cache.cache_widget_calculation("w1", "bounds", LONG, || 1);
        cache.cache_widget_calculation("w1", "collisions", LONG, || 2);
        cache.cache_widget_calculation("w10", "bounds", LONG, || 3);
        cache.cache_grid_layout("home", 6, 6, || 4);

        assert_eq!(cache.invalidate_widget_calculations("w1"), 2);
        assert_eq!(cache.get(&widget_key("w10", "bounds")), Some(3));
        assert_eq!(cache.invalidate_page_layouts("home"), 1);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn grid_layout_key_includes_dimensions() {
        let cache = ComputationCache::new(LONG);
        assert_eq!(cache.cache_grid_layout("home", 6, 6, || "six"), "six");
        assert_eq!(cache.cache_grid_layout("home", 4, 4, || "four"), "four");
        assert_eq!(cache.get(&layout_key("home", 6, 6)), Some("six"));
        assert!(cache.invalidate(&layout_key("home", 4, 4)));
        assert!(!cache.invalidate(&layout_key("home", 4, 4)));
    }

    #[test]
    fn storing_sweeps_expired_entries() {
        let cache = ComputationCache::new(LONG);
        let short = Duration::from_millis(1);
        for i in 0..50 {
            cache.get_or_compute(&format!("k{i}"), short, || i);
        }
        assert_eq!(cache.writer_count(), 0);

        thread::sleep(Duration::from_millis(20));
        cache.get_or_compute("fresh", LONG, || 99);
        assert_eq!(cache.stats().size, 1);
        assert_eq!(cache.get("fresh"), Some(99));
    }

    #[test]
    fn invalidation_during_compute_keeps_a_single_writer() {
        let cache = ComputationCache::new(LONG);
        let calls = AtomicUsize::new(0);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let (cache, calls) = (&cache, &calls);
        thread::scope(|scope| {
            let first = scope.spawn(move || {
                cache.get_or_compute("k", LONG, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            });

            started_rx.recv().unwrap();
            assert!(!cache.invalidate("k"));
            cache.clear();

            let second = scope.spawn(move || {
                cache.get_or_compute("k", LONG, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    2
                })
            });
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();

            assert_eq!(first.join().unwrap(), 1);
            assert_eq!(second.join().unwrap(), 1);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.writer_count(), 0);
    }

    #[test]
    fn concurrent_callers_compute_once_per_key() {
        let cache = Arc::new(ComputationCache::new(LONG));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.get_or_compute("shared", LONG, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        7
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 7);
    }
}
