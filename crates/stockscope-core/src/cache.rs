//! In-memory, time-bounded cache for fetch results.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use time::Duration;

use crate::clock::Clock;
use crate::UtcDateTime;

/// Defines how a fetch interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, fetch from the network and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry,
    /// and write the new result to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: UtcDateTime,
}

/// Keyed store whose entries stop being visible at their expiry time.
///
/// Not synchronized: the owner reads and writes through `&mut self`.
pub struct CacheStore<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            map: HashMap::new(),
            clock,
        }
    }

    pub fn now(&self) -> UtcDateTime {
        self.clock.now()
    }

    /// Expiry timestamp for an entry written now with the given TTL.
    pub fn expiry_after(&self, ttl: Duration) -> UtcDateTime {
        let now = self.now();
        UtcDateTime::from_offset_datetime(now.into_inner() + ttl).unwrap_or(now)
    }

    /// Value for `key` if present and not yet expired. An entry is expired
    /// from its `expires_at` instant onwards.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.now();
        self.map
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub fn put(&mut self, key: K, value: V, expires_at: UtcDateTime) {
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove expired entries from the cache.
    pub fn clear_expired(&mut self) {
        let now = self.now();
        self.map.retain(|_, entry| now < entry.expires_at);
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn store() -> (Arc<ManualClock>, CacheStore<String, String>) {
        let start = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        let clock = Arc::new(ManualClock::new(start));
        let cache = CacheStore::new(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_cache_store_basic_operations() {
        let (_, mut cache) = store();
        let expires_at = cache.expiry_after(Duration::seconds(60));

        assert!(cache.get(&"key1".to_string()).is_none());

        cache.put("key1".to_string(), "value1".to_string(), expires_at);
        assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));

        cache.put("key1".to_string(), "value2".to_string(), expires_at);
        assert_eq!(cache.get(&"key1".to_string()), Some("value2".to_string()));
    }

    #[test]
    fn test_cache_expiration_is_exclusive_of_deadline() {
        let (clock, mut cache) = store();
        let expires_at = cache.expiry_after(Duration::seconds(3600));
        cache.put("key1".to_string(), "value1".to_string(), expires_at);

        clock.advance(Duration::seconds(3599));
        assert!(cache.get(&"key1".to_string()).is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get(&"key1".to_string()).is_none());
    }

    #[test]
    fn test_cache_clear_expired() {
        let (clock, mut cache) = store();
        let short = cache.expiry_after(Duration::seconds(10));
        let long = cache.expiry_after(Duration::seconds(100));
        cache.put("key1".to_string(), "value1".to_string(), short);
        cache.put("key2".to_string(), "value2".to_string(), long);

        assert_eq!(cache.len(), 2);

        clock.advance(Duration::seconds(50));
        cache.clear_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&"key2".to_string()).is_some());
    }

    #[test]
    fn test_cache_clear_expired_empties_store() {
        let (clock, mut cache) = store();
        let expires_at = cache.expiry_after(Duration::seconds(60));
        cache.put("key1".to_string(), "value1".to_string(), expires_at);
        cache.put("key2".to_string(), "value2".to_string(), expires_at);

        clock.advance(Duration::seconds(60));
        assert_eq!(cache.len(), 2, "expired entries linger until purged");
        cache.clear_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_mode_default() {
        let mode: CacheMode = Default::default();
        assert_eq!(mode, CacheMode::Use);
        assert!(mode.reads() && mode.writes());
        assert!(!CacheMode::Refresh.reads() && CacheMode::Refresh.writes());
        assert!(!CacheMode::Bypass.reads() && !CacheMode::Bypass.writes());
    }
}
