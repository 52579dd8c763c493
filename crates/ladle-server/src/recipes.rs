//! Recipe service: cache-aside reads and invalidating writes.
//!
//! Reads of the whole listing go through the aggregate cache with store
//! fallback and repopulation. Every write mutates the store first and only
//! then evicts the listing key; a crash between the two leaves a stale
//! snapshot that self-heals on the next write, never a cache entry pointing
//! at state the store does not have yet.
//!
//! Concurrent listing misses may each query the store and repopulate the
//! cache independently. This stampede is tolerated: population is idempotent
//! and cheap next to a store read, so no miss lock is held.

use ladle_core::{Recipe, RecipeDraft};
use ladle_storage::{DynRecipeStore, StorageError};

use crate::cache::ListingCache;

/// Coordinates the recipe store and the listing cache.
pub struct RecipeService {
    store: DynRecipeStore,
    cache: ListingCache,
}

impl RecipeService {
    /// Creates a service over the given store and listing cache.
    pub fn new(store: DynRecipeStore, cache: ListingCache) -> Self {
        Self { store, cache }
    }

    /// The name of the underlying store backend, for the service banner.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Returns the full listing, served from cache when possible.
    ///
    /// On a miss the store is queried and the cache repopulated best-effort;
    /// a store failure propagates, a cache failure never does.
    pub async fn list(&self) -> Result<Vec<Recipe>, StorageError> {
        crate::metrics::record_recipe_operation("list");

        if let Some(recipes) = self.cache.get().await {
            tracing::debug!(count = recipes.len(), "listing served from cache");
            return Ok(recipes);
        }

        tracing::debug!("listing cache miss, querying store");
        let recipes = self.store.list_all().await?;
        self.cache.set(&recipes).await;
        Ok(recipes)
    }

    /// Reads a single recipe straight from the store.
    pub async fn get(&self, id: &str) -> Result<Option<Recipe>, StorageError> {
        crate::metrics::record_recipe_operation("get");
        self.store.find_by_id(id).await
    }

    /// Finds recipes by tag, ignoring ASCII case, straight from the store.
    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StorageError> {
        crate::metrics::record_recipe_operation("search");
        self.store.find_by_tag(tag).await
    }

    /// Validates and persists a new recipe, then evicts the listing.
    pub async fn create(&self, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        crate::metrics::record_recipe_operation("create");
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let recipe = self.store.insert(draft).await?;
        self.cache.invalidate().await;
        tracing::info!(id = %recipe.id, "recipe created");
        Ok(recipe)
    }

    /// Replaces an existing recipe's fields, then evicts the listing.
    ///
    /// A missing id surfaces as `NotFound` and leaves the cache untouched.
    pub async fn update(&self, id: &str, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        crate::metrics::record_recipe_operation("update");
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let recipe = self.store.update_by_id(id, draft).await?;
        self.cache.invalidate().await;
        tracing::info!(id = %id, "recipe updated");
        Ok(recipe)
    }

    /// Deletes a recipe, then evicts the listing.
    ///
    /// A missing id surfaces as `NotFound` and leaves the cache untouched.
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        crate::metrics::record_recipe_operation("delete");
        self.store.delete_by_id(id).await?;
        self.cache.invalidate().await;
        tracing::info!(id = %id, "recipe deleted");
        Ok(())
    }
}
