//! Bootstrap module for seeding initial users and recipes.
//!
//! Both seeds are idempotent: they run only against an empty store, so a
//! restart never duplicates data.

use ladle_auth::{Credential, CredentialStorage};
use ladle_core::RecipeDraft;
use ladle_storage::RecipeStore;
use tracing::{debug, info};

use crate::config::BootstrapUser;

/// Seeds configured users into an empty credential store.
///
/// # Errors
///
/// Returns an error if the credential store cannot be read or written.
pub async fn seed_credentials(
    storage: &dyn CredentialStorage,
    users: &[BootstrapUser],
) -> anyhow::Result<()> {
    if users.is_empty() {
        return Ok(());
    }
    if storage.count().await? > 0 {
        debug!("credential store already populated, skipping user bootstrap");
        return Ok(());
    }

    for user in users {
        storage
            .upsert(Credential::new(user.username.clone(), &user.password))
            .await?;
    }
    info!(count = users.len(), "bootstrap users seeded");
    Ok(())
}

/// Loads recipe drafts from a JSON file into an empty store.
///
/// The file holds an array of drafts; identities and publication timestamps
/// are assigned at insert like any other create.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed, or the store
/// rejects an insert.
pub async fn seed_recipes(
    store: &dyn RecipeStore,
    seed_file: Option<&str>,
) -> anyhow::Result<()> {
    let Some(path) = seed_file else {
        return Ok(());
    };

    if !store.list_all().await?.is_empty() {
        debug!("recipe store already populated, skipping seed file");
        return Ok(());
    }

    let raw = tokio::fs::read_to_string(path).await?;
    let drafts: Vec<RecipeDraft> = serde_json::from_str(&raw)?;
    let count = drafts.len();
    for draft in drafts {
        store.insert(draft).await?;
    }
    info!(count, path, "seed recipes loaded");
    Ok(())
}
