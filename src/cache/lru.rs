use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

/// Least-recently-used map from keys to shared, immutable values
struct LruMap<V> {
    capacity: usize,
    items: HashMap<String, Arc<V>>,
    access_order: Vec<String>,
}

impl<V> LruMap<V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: HashMap::with_capacity(capacity),
            access_order: Vec::with_capacity(capacity),
        }
    }

    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.to_string());
    }

    fn get(&mut self, key: &str) -> Option<Arc<V>> {
        let value = self.items.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn insert(&mut self, key: &str, value: Arc<V>) {
        if self.items.len() >= self.capacity && !self.items.contains_key(key) {
            if !self.access_order.is_empty() {
                let oldest = self.access_order.remove(0);
                self.items.remove(&oldest);
                debug!(key = %oldest, "Evicted from cache");
            }
        }
        self.touch(key);
        self.items.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Arc<V>> {
        self.access_order.retain(|k| k != key);
        self.items.remove(key)
    }
}

/// Thread-safe LRU cache of loaded indexes or parsed graphs.
///
/// Entries are never mutated in place; replacing a key swaps the `Arc`, so
/// readers holding the old value keep a consistent copy.
pub struct LruCache<V> {
    inner: Mutex<LruMap<V>>,
}

impl<V> LruCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruMap::new(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    /// Insert or replace, evicting the least recently used entry at capacity
    pub fn insert(&self, key: &str, value: Arc<V>) {
        self.inner.lock().insert(key, value)
    }

    pub fn remove(&self, key: &str) -> Option<Arc<V>> {
        self.inner.lock().remove(key)
    }

    /// Cached value, or the result of `load` which is then cached. The lock
    /// is not held while loading.
    pub fn get_or_try_insert_with<F>(&self, key: &str, load: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = Arc::new(load()?);
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = LruCache::new(2);
        cache.insert("english/a", Arc::new(1));
        cache.insert("english/b", Arc::new(2));
        assert_eq!(cache.get("english/a").as_deref(), Some(&1));

        cache.insert("english/c", Arc::new(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key("english/a"));
        assert!(!cache.contains_key("english/b"));
        assert!(cache.contains_key("english/c"));
    }

    #[test]
    fn test_replace_keeps_old_readers_consistent() {
        let cache = LruCache::new(2);
        cache.insert("english", Arc::new("old".to_string()));
        let held = cache.get("english").unwrap();
        cache.insert("english", Arc::new("new".to_string()));

        assert_eq!(held.as_str(), "old");
        assert_eq!(cache.get("english").unwrap().as_str(), "new");
        assert_eq!(cache.len(), 1);
        assert!(cache.remove("english").is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let cache: LruCache<u32> = LruCache::new(4);
        let mut loads = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("english", || {
                    loads += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(*value, 7);
        }
        assert_eq!(loads, 1);

        let err = cache
            .get_or_try_insert_with("italian", || Err(SearchError::IndexNotFound("italian".into())))
            .unwrap_err();
        assert!(matches!(err, SearchError::IndexNotFound(_)));
        assert!(!cache.contains_key("italian"));
    }
}
