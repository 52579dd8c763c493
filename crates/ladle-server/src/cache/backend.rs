//! Cache backend implementation: local DashMap or Redis.

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached entry with optional expiry.
///
/// The data is wrapped in `Arc` to allow cheap cloning on cache hits.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Option<Duration>,
}

impl CachedEntry {
    /// Create a new cached entry. `None` means the entry never expires on
    /// its own and lives until deleted.
    pub fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|ttl| self.cached_at.elapsed() > ttl)
    }
}

/// Key→blob cache backend.
///
/// ## Cache Modes
///
/// - **Local**: single-instance mode using only DashMap
/// - **Redis**: shared cache over a connection pool
///
/// A miss is `None`, distinct from an empty blob. Redis failures are logged
/// and reported as misses (get) or dropped (set/delete); they never surface
/// to the caller. Writes and deletes are awaited so that a mutation's
/// eviction has been attempted by the time the mutation returns; external
/// Redis eviction between requests simply reads as a miss.
#[derive(Clone)]
pub enum CacheBackend {
    /// Single-instance: local DashMap only
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Shared cache in Redis
    Redis {
        redis: Pool,
    },
}

impl CacheBackend {
    /// Create a new local-only cache backend.
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    /// Create a new Redis-backed cache backend.
    pub fn new_redis(redis_pool: Pool) -> Self {
        CacheBackend::Redis { redis: redis_pool }
    }

    /// Get a value from the cache. `None` is the miss sentinel.
    pub async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        match self {
            CacheBackend::Local(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        crate::metrics::record_cache_hit("local");
                        return Some(Arc::clone(&entry.data));
                    }
                    drop(entry);
                    map.remove(key);
                }
                crate::metrics::record_cache_miss();
                None
            }
            CacheBackend::Redis { redis } => match redis.get().await {
                Ok(mut conn) => match conn.get::<_, Option<Vec<u8>>>(key).await {
                    Ok(Some(data)) => {
                        tracing::debug!(key = %key, "cache hit");
                        crate::metrics::record_cache_hit("redis");
                        Some(Arc::new(data))
                    }
                    Ok(None) => {
                        tracing::debug!(key = %key, "cache miss");
                        crate::metrics::record_cache_miss();
                        None
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Redis GET error");
                        crate::metrics::record_cache_miss();
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                    crate::metrics::record_cache_miss();
                    None
                }
            },
        }
    }

    /// Set a value in the cache, best effort. A failure degrades to repeated
    /// misses and is never reported to the caller.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis { redis } => {
                let mut conn = match redis.get().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Failed to get Redis connection");
                        return;
                    }
                };
                let result = match ttl {
                    Some(ttl) => {
                        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await
                    }
                    None => conn.set::<_, _, ()>(key, value).await,
                };
                match result {
                    Ok(()) => tracing::debug!(key = %key, "cache set"),
                    Err(e) => tracing::warn!(key = %key, error = %e, "Redis SET error"),
                }
            }
        }
    }

    /// Delete a cache entry, best effort. A failure leaves a stale entry
    /// that self-heals on the next write or Redis eviction.
    pub async fn delete(&self, key: &str) {
        match self {
            CacheBackend::Local(map) => {
                map.remove(key);
                tracing::debug!(key = %key, "cache entry deleted (local)");
            }
            CacheBackend::Redis { redis } => {
                let mut conn = match redis.get().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Failed to get Redis connection");
                        return;
                    }
                };
                match conn.del::<_, ()>(key).await {
                    Ok(()) => tracing::debug!(key = %key, "cache entry deleted"),
                    Err(e) => tracing::warn!(key = %key, error = %e, "Redis DEL error"),
                }
            }
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        match self {
            CacheBackend::Local(map) => CacheStats {
                entries: map.len(),
                mode: "local".to_string(),
            },
            CacheBackend::Redis { .. } => CacheStats {
                entries: 0,
                mode: "redis".to_string(),
            },
        }
    }

    /// Check if Redis is available (for health checks).
    pub async fn is_redis_available(&self) -> bool {
        match self {
            CacheBackend::Local(_) => false,
            CacheBackend::Redis { redis } => redis.get().await.is_ok(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub mode: String,
}
