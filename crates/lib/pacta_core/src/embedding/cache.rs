// @awa-component: EMB-ResultCache
//
//! Result cache — content-fingerprint memoization of embeddings.
//!
//! The fingerprint is a SHA-256 hex digest of the exact post-truncation
//! text, so it is stable across processes and versions. Entries expire
//! after 24 hours and are dropped on the first read past expiry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::EmbeddingError;
use super::failover::EmbeddedVector;

/// Cache time-to-live.
pub const CACHE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: EmbeddedVector,
    expires_at: DateTime<Utc>,
}

/// Concurrent fingerprint → embedding map with TTL.
///
/// Writes are not mutually exclusive across concurrent identical
/// requests: the value is content-determined, so duplicate computation is
/// permitted and the last writer wins.
pub struct EmbeddingCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(CACHE_TTL_HOURS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Stable content fingerprint of the exact submitted text.
    pub fn fingerprint(text: &str) -> String {
        format!("{:x}", Sha256::digest(text.as_bytes()))
    }

    /// Fresh value for a fingerprint, dropping the entry if expired.
    pub fn get(&self, fingerprint: &str) -> Option<EmbeddedVector> {
        let hit = self.entries.get(fingerprint).and_then(|entry| {
            if Utc::now() < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        });
        if hit.is_none() {
            self.entries
                .remove_if(fingerprint, |_, entry| Utc::now() >= entry.expires_at);
        }
        hit
    }

    /// Insert or refresh an entry with a fresh expiry.
    pub fn insert(&self, fingerprint: String, value: EmbeddedVector) {
        self.entries.insert(
            fingerprint,
            CacheEntry {
                value,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    /// Return the cached vector for `text`, computing and storing it on
    /// miss or expiry.
    pub async fn get_or_compute<F, Fut>(
        &self,
        text: &str,
        compute: F,
    ) -> Result<EmbeddedVector, EmbeddingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EmbeddedVector, EmbeddingError>>,
    {
        let fingerprint = Self::fingerprint(text);
        if let Some(hit) = self.get(&fingerprint) {
            debug!(fingerprint = %&fingerprint[..12], "embedding cache hit");
            return Ok(hit);
        }

        let value = compute().await?;
        self.insert(fingerprint, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn vector(sentinel: f32) -> EmbeddedVector {
        EmbeddedVector {
            vector: vec![sentinel; 4],
            model: "test-model".to_string(),
            provider: "test".to_string(),
        }
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        assert_eq!(
            EmbeddingCache::fingerprint("the same text"),
            EmbeddingCache::fingerprint("the same text")
        );
        assert_ne!(
            EmbeddingCache::fingerprint("text a"),
            EmbeddingCache::fingerprint("text b")
        );
        // SHA-256 hex digest.
        assert_eq!(EmbeddingCache::fingerprint("x").len(), 64);
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_skips_compute() {
        let cache = EmbeddingCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute("identical text", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vector(0.25))
                })
                .await
                .unwrap();
            assert_eq!(value.vector, vec![0.25; 4]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_entry_recomputes() {
        let cache = EmbeddingCache::with_ttl(Duration::zero());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_compute("text", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vector(1.0))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expired_entry_dropped_on_read() {
        let cache = EmbeddingCache::with_ttl(Duration::zero());
        let fp = EmbeddingCache::fingerprint("t");
        cache.insert(fp.clone(), vector(1.0));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&fp).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn compute_failure_is_not_cached() {
        let cache = EmbeddingCache::new();
        let err = cache
            .get_or_compute("failing text", || async {
                Err(EmbeddingError::Timeout("down".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Timeout(_)));
        assert!(cache.is_empty());
    }
}
