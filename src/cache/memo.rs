use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;

use super::core::{CacheStats, ComputationCache};

/// Builds a cache key from call arguments.
pub type KeyGenerator<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

pub struct MemoOptions<A: ?Sized> {
    pub ttl: Duration,
    pub key_generator: Option<KeyGenerator<A>>,
}

impl<A: ?Sized> Default for MemoOptions<A> {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            key_generator: None,
        }
    }
}

impl<A: ?Sized> MemoOptions<A> {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_key_generator<G>(mut self, generator: G) -> Self
    where
        G: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.key_generator = Some(Box::new(generator));
        self
    }
}

/// A function wrapped with its own TTL cache. See [`memoize`].
pub struct Memoized<A: ?Sized, V, F> {
    func: F,
    ttl: Duration,
    key_generator: Option<KeyGenerator<A>>,
    cache: ComputationCache<V>,
    _args: PhantomData<fn(&A)>,
}

/// Wraps `func` so repeated calls with the same key reuse the last result
/// until it is older than `options.ttl`.
///
/// Without a key generator the key is a blake3 digest of the arguments'
/// canonical JSON form (object keys sorted); arguments that fail to
/// serialise bypass the cache.
pub fn memoize<A, V, F>(func: F, options: MemoOptions<A>) -> Memoized<A, V, F>
where
    A: Serialize + ?Sized,
    V: Clone,
    F: Fn(&A) -> V,
{
    Memoized {
        func,
        ttl: options.ttl,
        key_generator: options.key_generator,
        cache: ComputationCache::new(options.ttl),
        _args: PhantomData,
    }
}

impl<A, V, F> Memoized<A, V, F>
where
    A: Serialize + ?Sized,
    V: Clone,
    F: Fn(&A) -> V,
{
    pub fn call(&self, args: &A) -> V {
        match self.key_for(args) {
            Some(key) => self
                .cache
                .get_or_compute(&key, self.ttl, || (self.func)(args)),
            None => (self.func)(args),
        }
    }

    pub fn cache(&self) -> &ComputationCache<V> {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn key_for(&self, args: &A) -> Option<String> {
        if let Some(generate) = &self.key_generator {
            return Some(generate(args));
        }
        // Going through `Value` sorts object keys, so map arguments hash the
        // same regardless of their iteration order.
        let value = serde_json::to_value(args).ok()?;
        let bytes = serde_json::to_vec(&value).ok()?;
        Some(format!("memo:{}", blake3::hash(&bytes).to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[test]
    fn serialised_arguments_key_the_cache() {
        let calls = Cell::new(0);
        let square = memoize(
            |n: &u32| {
                calls.set(calls.get() + 1);
                n * n
            },
            MemoOptions::default(),
        );
        assert_eq!(square.call(&4), 16);
        assert_eq!(square.call(&4), 16);
        assert_eq!(square.call(&5), 25);
        assert_eq!(calls.get(), 2);
        assert_eq!(square.stats().size, 2);
    }

    #[test]
    fn custom_key_generator_groups_calls() {
        let calls = Cell::new(0);
        let length = memoize(
            |s: &str| {
                calls.set(calls.get() + 1);
                s.len()
            },
            MemoOptions::default().with_key_generator(|s: &str| s.to_lowercase()),
        );
        assert_eq!(length.call("Grid"), 4);
        assert_eq!(length.call("GRID"), 4);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn map_arguments_key_independently_of_insertion_order() {
        let calls = Cell::new(0);
        let total = memoize(
            |spans: &HashMap<String, u32>| {
                calls.set(calls.get() + 1);
                spans.values().sum::<u32>()
            },
            MemoOptions::default(),
        );
        let forward: HashMap<String, u32> = (0..32).map(|i| (format!("w{i}"), i)).collect();
        let backward: HashMap<String, u32> =
            (0..32).rev().map(|i| (format!("w{i}"), i)).collect();

        assert_eq!(total.call(&forward), 496);
        assert_eq!(total.call(&backward), 496);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unserialisable_arguments_skip_the_cache() {
        let calls = Cell::new(0);
        let count = memoize(
            |map: &HashMap<(u8, u8), u8>| {
                calls.set(calls.get() + 1);
                map.len()
            },
            MemoOptions::default(),
        );
        let mut args = HashMap::new();
        args.insert((1, 2), 3);
        count.call(&args);
        count.call(&args);
        assert_eq!(calls.get(), 2);
        assert_eq!(count.stats().size, 0);
    }
}
