use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Simple thread-safe in-memory memoization map.
/// Values are handed out as `Arc` so reads never hold the lock.
pub struct ResolutionMemo<K, V> {
    inner: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> Default for ResolutionMemo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ResolutionMemo<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut map = self.inner.write();
        map.insert(key, value.clone());
        value
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let map = self.inner.read();
        map.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        let mut map = self.inner.write();
        map.clear();
    }
}
