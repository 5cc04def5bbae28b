use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

/// Key provider wrapper that keeps resolved keys for a TTL
///
/// Only successful resolutions are stored, so every failure the inner
/// provider reports is reported again on the next call.
#[derive(Debug)]
pub struct CachedKeyProvider<P: KeyProvider> {
    inner: P,
    cache: Cache<KeyId, Arc<ResolvedKey>>,
}

impl<P: KeyProvider> CachedKeyProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, 100)
    }

    pub fn with_capacity(inner: P, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self { inner, cache }
    }

    /// Invalidate a specific key from cache
    pub async fn invalidate(&self, key_id: &KeyId) {
        self.cache.invalidate(key_id).await;
    }

    /// Invalidate all cached keys
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Number of live entries once pending evictions have been applied
    pub async fn cache_size(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl<P: KeyProvider> KeyProvider for CachedKeyProvider<P> {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        if let Some(cached) = self.cache.get(key_id).await {
            tracing::debug!(
                provider = self.inner.provider_name(),
                key_id = %key_id,
                "Cache hit for key"
            );
            return Ok((*cached).clone());
        }

        tracing::debug!(
            provider = self.inner.provider_name(),
            key_id = %key_id,
            "Cache miss, resolving key"
        );

        let key = self.inner.resolve(key_id).await?;
        self.cache
            .insert(key_id.clone(), Arc::new(key.clone()))
            .await;

        Ok(key)
    }

    async fn refresh(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        self.invalidate(key_id).await;
        self.resolve(key_id).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
