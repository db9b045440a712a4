//! Per-run digest cache in front of a [`ContainerRegistry`].
//!
//! Keyed by the exact `(image, tag)` pair. Entries are never evicted within a
//! run; a fresh cache is built for every run. Failed lookups are not cached.

use std::sync::Arc;

use bumper_core::errors::RegistryError;
use bumper_core::CancellationToken;
use moka::sync::Cache;

use super::ContainerRegistry;

type CacheKey = (String, String);

pub struct DigestCache {
    registry: Arc<dyn ContainerRegistry>,
    inner: Cache<CacheKey, String>,
}

impl DigestCache {
    pub fn new(registry: Arc<dyn ContainerRegistry>) -> Self {
        Self {
            registry,
            inner: Cache::builder().build(),
        }
    }

    /// Resolve `image:tag`, consulting the registry only on the first lookup.
    pub fn resolve(
        &self,
        image: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RegistryError> {
        if cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        let key = (image.to_string(), tag.to_string());
        if let Some(digest) = self.inner.get(&key) {
            return Ok(digest);
        }
        let digest = self.registry.resolve_digest(image, tag, cancel)?;
        tracing::debug!(image, tag, digest = %digest, "resolved image digest");
        self.inner.insert(key, digest.clone());
        Ok(digest)
    }

    /// Number of cached digests.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
