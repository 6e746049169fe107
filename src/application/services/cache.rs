//! Cache-aside lookup in front of a slow upstream source

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::errors::RemoteFetchError;
use crate::domain::entities::{ItemInfo, ItemKey};
use crate::domain::traits::GameApi;

/// Slow path of a [`CacheAside`]
#[async_trait]
pub trait Fetch<K, V>: Send + Sync {
    /// `Ok(None)` when the source answered but has no such entry
    async fn fetch(&self, key: &K) -> Result<Option<V>, RemoteFetchError>;
}

/// Memoized key to value lookup.
///
/// Entries never expire: upstream identifiers are immutable once assigned.
/// Absence and fetch failures are not cached, so a flaky upstream cannot
/// poison the cache. Two concurrent misses on one key may both reach the
/// source; the first value written wins and both callers get it.
pub struct CacheAside<K, V> {
    entries: RwLock<HashMap<K, V>>,
    source: Arc<dyn Fetch<K, V>>,
}

impl<K, V> CacheAside<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(source: Arc<dyn Fetch<K, V>>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            source,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        if let Some(value) = self.cached(key) {
            return Some(value);
        }

        match self.source.fetch(key).await {
            Ok(Some(value)) => {
                let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                Some(entries.entry(key.clone()).or_insert(value).clone())
            }
            Ok(None) => {
                tracing::debug!(key = ?key, "Upstream has no entry");
                None
            }
            Err(e) => {
                tracing::warn!(key = ?key, error = %e, "Upstream lookup failed");
                None
            }
        }
    }

    /// Cache hit only, never calls the source
    pub fn cached(&self, key: &K) -> Option<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Item metadata keyed by (region, item id)
pub type ItemCache = CacheAside<ItemKey, ItemInfo>;

/// Fetches item metadata from the game API
pub struct ItemFetcher {
    api: Arc<dyn GameApi>,
}

impl ItemFetcher {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Fetch<ItemKey, ItemInfo> for ItemFetcher {
    async fn fetch(&self, key: &ItemKey) -> Result<Option<ItemInfo>, RemoteFetchError> {
        self.api.item(&key.region, key.item_id).await
    }
}

impl ItemCache {
    pub fn for_api(api: Arc<dyn GameApi>) -> Self {
        Self::new(Arc::new(ItemFetcher::new(api)))
    }
}
