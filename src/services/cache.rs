use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory cache for derived match results
///
/// Match results are never authoritative, so entries simply expire after
/// the TTL or are dropped when a profile or listing changes.
pub struct CacheManager {
    l1_cache: Cache<CacheKey, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = Cache::builder()
            .max_capacity(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .support_invalidation_closures()
            .build();

        Self { l1_cache, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Get a value from cache
    pub async fn get<T>(&self, key: &CacheKey) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.l1_cache.get(key).await {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    /// Set a value in cache
    pub async fn set<T>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.l1_cache.insert(key.clone(), bytes).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a single entry
    pub async fn delete(&self, key: &CacheKey) {
        self.l1_cache.invalidate(key).await;
    }

    /// Drop every cached result involving a developer
    pub fn invalidate_developer(&self, developer_id: &str) {
        let developer_id = developer_id.to_string();
        self.invalidate_where(move |key| key.developer_id == developer_id);
    }

    /// Drop every cached result involving a listing
    pub fn invalidate_listing(&self, listing_id: &str) {
        let listing_id = listing_id.to_string();
        self.invalidate_where(move |key| key.listing_id == listing_id);
    }

    fn invalidate_where<F>(&self, predicate: F)
    where
        F: Fn(&CacheKey) -> bool + Send + Sync + 'static,
    {
        let result = self
            .l1_cache
            .invalidate_entries_if(move |key, _| predicate(key));

        if let Err(e) = result {
            // Closures are enabled at build time; fall back to a full clear anyway
            tracing::warn!("Selective cache invalidation failed ({}), clearing cache", e);
            self.l1_cache.invalidate_all();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub ttl_secs: u64,
}

/// Key of a cached (developer, listing) match result
///
/// Carries the store versions the result was computed from, so a result
/// written after either side changed is never looked up again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    developer_id: String,
    profile_version: u64,
    listing_id: String,
    listing_version: u64,
}

impl CacheKey {
    pub fn match_result(
        developer_id: &str,
        profile_version: u64,
        listing_id: &str,
        listing_version: u64,
    ) -> Self {
        Self {
            developer_id: developer_id.to_string(),
            profile_version,
            listing_id: listing_id.to_string(),
            listing_version,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "match[{}@{}, {}@{}]",
            self.developer_id, self.profile_version, self.listing_id, self.listing_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;

    fn result(total: f64) -> MatchResult {
        MatchResult {
            topic_score: 100.0,
            experience_score: 100.0,
            language_score: 100.0,
            total_score: total,
        }
    }

    fn key(developer_id: &str, listing_id: &str) -> CacheKey {
        CacheKey::match_result(developer_id, 1, listing_id, 1)
    }

    #[test]
    fn test_cache_set_get() {
        tokio_test::block_on(async {
            let cache = CacheManager::new(100, 60);
            let key = key("dev", "l1");

            cache.set(&key, &result(88.0)).await.unwrap();
            let cached: MatchResult = cache.get(&key).await.unwrap();
            assert_eq!(cached.total_score, 88.0);

            cache.delete(&key).await;
            assert!(matches!(
                cache.get::<MatchResult>(&key).await,
                Err(CacheError::CacheMiss(_))
            ));
        });
    }

    #[test]
    fn test_invalidate_by_developer_and_listing() {
        tokio_test::block_on(async {
            let cache = CacheManager::new(100, 60);
            let a1 = key("alice", "l1");
            let a2 = key("alice", "l2");
            let b1 = key("bob", "l1");
            let b2 = key("bob", "l2");
            for key in [&a1, &a2, &b1, &b2] {
                cache.set(key, &result(90.0)).await.unwrap();
            }

            cache.invalidate_developer("alice");
            assert!(cache.get::<MatchResult>(&a1).await.is_err());
            assert!(cache.get::<MatchResult>(&a2).await.is_err());
            assert!(cache.get::<MatchResult>(&b1).await.is_ok());

            cache.invalidate_listing("l1");
            assert!(cache.get::<MatchResult>(&b1).await.is_err());
            assert!(cache.get::<MatchResult>(&b2).await.is_ok());
        });
    }

    #[test]
    fn test_ids_containing_separators_do_not_collide() {
        tokio_test::block_on(async {
            let cache = CacheManager::new(100, 60);
            cache.set(&key("a:b", "c"), &result(12.0)).await.unwrap();
            cache.set(&key("x", "y"), &result(50.0)).await.unwrap();

            assert!(cache.get::<MatchResult>(&key("a", "b:c")).await.is_err());

            // Prefix-like ids are distinct developers and listings
            cache.set(&key("a", "b:c"), &result(34.0)).await.unwrap();
            cache.invalidate_developer("a");
            assert!(cache.get::<MatchResult>(&key("a:b", "c")).await.is_ok());

            cache.invalidate_listing("c");
            assert!(cache.get::<MatchResult>(&key("a:b", "c")).await.is_err());
            assert!(cache.get::<MatchResult>(&key("x", "y")).await.is_ok());
        });
    }

    #[test]
    fn test_versions_are_part_of_the_key() {
        tokio_test::block_on(async {
            let cache = CacheManager::new(100, 60);
            cache
                .set(&CacheKey::match_result("dev", 1, "l1", 4), &result(70.0))
                .await
                .unwrap();

            assert!(cache
                .get::<MatchResult>(&CacheKey::match_result("dev", 2, "l1", 4))
                .await
                .is_err());
            assert!(cache
                .get::<MatchResult>(&CacheKey::match_result("dev", 1, "l1", 5))
                .await
                .is_err());
        });
    }
}
