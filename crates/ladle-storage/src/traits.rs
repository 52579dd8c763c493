//! Storage traits for the recipe storage abstraction layer.

use std::sync::Arc;

use async_trait::async_trait;
use ladle_core::{Recipe, RecipeDraft};

use crate::error::StorageError;

/// Shared handle to a recipe store backend.
pub type DynRecipeStore = Arc<dyn RecipeStore>;

/// The contract every recipe storage backend implements.
///
/// Backends own identity assignment: `insert` mints the id and publication
/// timestamp, and no later operation may change either. Implementations must
/// be safe for concurrent use (`Send + Sync`); every operation is a round
/// trip to the backend, and infrastructure failures surface as
/// [`StorageError::ConnectionError`] or [`StorageError::Internal`], never as
/// `NotFound`.
///
/// # Example
///
/// ```ignore
/// use ladle_storage::{RecipeStore, StorageError};
///
/// async fn first_recipe(store: &dyn RecipeStore) -> Result<(), StorageError> {
///     for recipe in store.list_all().await? {
///         println!("{}", recipe.name);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Persists a new recipe, assigning its identity and publication
    /// timestamp, and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if the draft is malformed.
    async fn insert(&self, draft: RecipeDraft) -> Result<Recipe, StorageError>;

    /// Returns every recipe in creation order.
    async fn list_all(&self) -> Result<Vec<Recipe>, StorageError>;

    /// Reads a recipe by id.
    ///
    /// Returns `None` if the recipe does not exist; errors are reserved for
    /// infrastructure failure.
    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StorageError>;

    /// Replaces the mutable fields of an existing recipe.
    ///
    /// Identity and publication timestamp are preserved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no recipe has the given id.
    async fn update_by_id(&self, id: &str, draft: RecipeDraft) -> Result<Recipe, StorageError>;

    /// Deletes a recipe by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no recipe has the given id.
    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError>;

    /// Returns every recipe carrying the given tag, matched exactly but
    /// ignoring ASCII case.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
