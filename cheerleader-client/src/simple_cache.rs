use std::time::Duration;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    created: Instant,
}

/// Remembers the last value stored, together with the key it was fetched for.
#[derive(Debug)]
pub(crate) struct SimpleCache<K, V> {
    entry: RwLock<Option<Entry<K, V>>>,
    ttl: Duration,
}

impl<K, V> SimpleCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V>
    where
        K: PartialEq,
        V: Clone,
    {
        match &*self.entry.read().await {
            Some(entry) if entry.key == *key && entry.created.elapsed() < self.ttl => {
                Some(entry.value.clone())
            }
            _ => None,
        }
    }

    pub async fn set(&self, key: K, value: V) {
        *self.entry.write().await = Some(Entry {
            key,
            value,
            created: Instant::now(),
        });
    }

    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::SimpleCache;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = SimpleCache::new(Duration::from_millis(100));

        cache.set(1, "test_value".to_string()).await;

        assert_eq!(cache.get(&1).await, Some("test_value".to_string()));

        sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get(&1).await, None);
    }

    #[tokio::test]
    async fn test_cache_only_keeps_last_key() {
        let cache = SimpleCache::new(Duration::from_secs(60));

        cache.set(1, "first".to_string()).await;
        cache.set(2, "second".to_string()).await;

        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, Some("second".to_string()));

        cache.clear().await;
        assert_eq!(cache.get(&2).await, None);
    }
}
