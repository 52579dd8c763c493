//! Aggregate listing cache.
//!
//! One cache entry represents the entire recipe listing: key `recipes:all`,
//! value a MessagePack snapshot of the collection at last population time.
//! Any write to any recipe evicts this single key; there is no per-record
//! fan-out.
//!
//! A blob that fails to deserialize is treated as a miss: the entry is
//! evicted and the caller falls back to the store.

use std::time::Duration;

use ladle_core::Recipe;

use super::backend::CacheBackend;

/// The aggregate key for the whole-collection snapshot.
pub const LISTING_KEY: &str = "recipes:all";

/// Typed cache for the recipe listing snapshot.
pub struct ListingCache {
    backend: CacheBackend,
    ttl: Option<Duration>,
}

impl ListingCache {
    /// Create a new listing cache over the given backend.
    pub fn new(backend: CacheBackend, ttl: Option<Duration>) -> Self {
        Self { backend, ttl }
    }

    /// Get the cached listing snapshot, or `None` on miss.
    pub async fn get(&self) -> Option<Vec<Recipe>> {
        let data = self.backend.get(LISTING_KEY).await?;
        match rmp_serde::from_slice::<Vec<Recipe>>(&data) {
            Ok(recipes) => Some(recipes),
            Err(e) => {
                tracing::warn!(key = %LISTING_KEY, error = %e, "Failed to deserialize cached listing");
                self.backend.delete(LISTING_KEY).await;
                None
            }
        }
    }

    /// Cache a listing snapshot after a successful store read, best effort.
    pub async fn set(&self, recipes: &[Recipe]) {
        match rmp_serde::to_vec(recipes) {
            Ok(data) => {
                self.backend.set(LISTING_KEY, data, self.ttl).await;
            }
            Err(e) => {
                tracing::warn!(key = %LISTING_KEY, error = %e, "Failed to serialize listing for cache");
            }
        }
    }

    /// Evict the snapshot (on create/update/delete).
    pub async fn invalidate(&self) {
        self.backend.delete(LISTING_KEY).await;
    }
}
