//! Cache backend seam.
//!
//! The cache is an external key-value collaborator with get/set/evict
//! semantics. The core ships an in-process backend for development and
//! testing; anything that leaves the process goes through [`SealedCache`]
//! so user-derived values are encrypted at rest.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use suite_common::{CacheConfig, ConfigError, CryptoConfig};
use tracing::{debug, warn};

use crate::crypto::SecretSealer;

/// External key-value service seam.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String);
    async fn evict(&self, key: &str);
}

/// In-process cache with uniform time-to-live.
pub struct MemoryCache {
    inner: moka::future::Cache<String, String>,
}

impl MemoryCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value).await;
    }

    async fn evict(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

/// Decorator sealing values before they reach the wrapped backend.
///
/// A value that fails to unseal (tampering, key rotation) reads as a miss.
pub struct SealedCache<B> {
    backend: B,
    sealer: SecretSealer,
}

impl<B: CacheBackend> SealedCache<B> {
    pub fn new(backend: B, sealer: SecretSealer) -> Self {
        Self { backend, sealer }
    }
}

#[async_trait]
impl<B: CacheBackend> CacheBackend for SealedCache<B> {
    async fn get(&self, key: &str) -> Option<String> {
        let sealed = self.backend.get(key).await?;
        let value = self.sealer.open(&sealed);
        if value.is_none() {
            debug!(key, "cached value failed to unseal, treating as miss");
        }
        value
    }

    async fn set(&self, key: &str, value: String) {
        match self.sealer.seal(&value) {
            Ok(sealed) => self.backend.set(key, sealed).await,
            Err(error) => warn!(key, %error, "dropping cache write, sealing failed"),
        }
    }

    async fn evict(&self, key: &str) {
        self.backend.evict(key).await;
    }
}

/// Build the configured cache, sealed with the configured key.
///
/// External descriptors are opaque wiring owned by the embedding process;
/// until one is supplied through the trait, they fall back to the in-process
/// backend.
pub fn build_cache(
    cache: &CacheConfig,
    crypto: &CryptoConfig,
) -> Result<Arc<dyn CacheBackend>, ConfigError> {
    let sealer = SecretSealer::new(&crypto.encryption_key)?;
    let (max_entries, ttl_secs) = match cache {
        CacheConfig::Memory {
            max_entries,
            ttl_secs,
        } => (*max_entries, *ttl_secs),
        CacheConfig::External { kind, .. } => {
            warn!(%kind, "external cache descriptor not wired, using in-process cache");
            (10_000, 60)
        }
    };
    Ok(Arc::new(SealedCache::new(
        MemoryCache::new(max_entries, Duration::from_secs(ttl_secs)),
        sealer,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed_cache() -> SealedCache<MemoryCache> {
        SealedCache::new(
            MemoryCache::new(100, Duration::from_secs(60)),
            SecretSealer::new(&[9u8; 32]).expect("key"),
        )
    }

    #[tokio::test]
    async fn test_set_get_evict() {
        let cache = sealed_cache();
        cache.set("k", "v".into()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        cache.evict("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_values_are_sealed_at_rest() {
        let backend = MemoryCache::new(100, Duration::from_secs(60));
        let cache = SealedCache::new(backend, SecretSealer::new(&[9u8; 32]).expect("key"));
        cache.set("k", "plaintext".into()).await;

        // read through the inner backend: the stored form is not the plaintext
        let stored = cache.backend.get("k").await.expect("stored");
        assert_ne!(stored, "plaintext");
    }

    #[tokio::test]
    async fn test_unsealable_value_is_a_miss() {
        let cache = sealed_cache();
        cache.backend.set("k", "not-a-sealed-value".into()).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_build_cache_requires_key() {
        let err = build_cache(&CacheConfig::default(), &CryptoConfig::default()).err();
        assert_eq!(err, Some(ConfigError::MissingSecret("encryption_key")));
    }
}
