use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ladle_core::{Recipe, RecipeDraft, generate_id};
use ladle_storage::{RecipeStore, StorageError};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory recipe storage.
///
/// A `BTreeMap` keyed by the UUIDv7 identity, guarded by a `tokio` RwLock.
/// Key order is creation order, per-record mutation is atomic under the
/// write guard, and readers never observe a half-written record.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<BTreeMap<String, Recipe>>>,
}

impl InMemoryStorage {
    /// Creates an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recipes.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Returns `true` when no recipes are stored.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl RecipeStore for InMemoryStorage {
    async fn insert(&self, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let recipe = draft.into_recipe(generate_id(), OffsetDateTime::now_utc());
        let mut guard = self.data.write().await;
        guard.insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, StorageError> {
        let guard = self.data.read().await;
        Ok(guard.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StorageError> {
        let guard = self.data.read().await;
        Ok(guard.get(id).cloned())
    }

    async fn update_by_id(&self, id: &str, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let mut guard = self.data.write().await;
        match guard.get_mut(id) {
            Some(recipe) => {
                draft.apply_to(recipe);
                Ok(recipe.clone())
            }
            None => Err(StorageError::not_found(id)),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let mut guard = self.data.write().await;
        match guard.remove(id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(id)),
        }
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StorageError> {
        let guard = self.data.read().await;
        Ok(guard
            .values()
            .filter(|recipe| recipe.has_tag(tag))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> RecipeDraft {
        RecipeDraft {
            name: "Soup".to_string(),
            tags: vec!["dinner".to_string()],
            ingredients: vec!["water".to_string()],
            instructions: vec!["boil".to_string()],
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_timestamp() {
        let store = InMemoryStorage::new();
        let recipe = store.insert(soup()).await.unwrap();
        assert!(!recipe.id.is_empty());
        assert_eq!(recipe.name, "Soup");

        let found = store.find_by_id(&recipe.id).await.unwrap();
        assert_eq!(found, Some(recipe));
    }

    #[tokio::test]
    async fn insert_rejects_invalid_draft() {
        let store = InMemoryStorage::new();
        let err = store.insert(RecipeDraft::default()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_preserves_identity_and_timestamp() {
        let store = InMemoryStorage::new();
        let created = store.insert(soup()).await.unwrap();

        let mut update = soup();
        update.name = "Stew".to_string();
        update.tags = vec!["lunch".to_string()];
        let updated = store.update_by_id(&created.id, update).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.published_at, created.published_at);
        assert_eq!(updated.name, "Stew");
    }

    #[tokio::test]
    async fn update_missing_returns_not_found() {
        let store = InMemoryStorage::new();
        let err = store.update_by_id("nope", soup()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_returns_not_found() {
        let store = InMemoryStorage::new();
        let err = store.delete_by_id("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn tag_search_is_case_insensitive_and_moves_with_updates() {
        let store = InMemoryStorage::new();
        let created = store.insert(soup()).await.unwrap();

        let hits = store.find_by_tag("DINNER").await.unwrap();
        assert_eq!(hits.len(), 1);

        let mut update = soup();
        update.tags = vec!["lunch".to_string()];
        store.update_by_id(&created.id, update).await.unwrap();

        assert!(store.find_by_tag("dinner").await.unwrap().is_empty());
        assert_eq!(store.find_by_tag("Lunch").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_returns_all_recipes() {
        let store = InMemoryStorage::new();
        store.insert(soup()).await.unwrap();
        let mut second = soup();
        second.name = "Salad".to_string();
        store.insert(second).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
