//! Credential type, password digesting, and the credential storage trait.
//!
//! Passwords are stored only as fixed-length SHA-256 digests, hex encoded.
//! Digests are compared for equality and never reversed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::AuthResult;

/// Shared handle to a credential storage backend.
pub type DynCredentialStorage = Arc<dyn CredentialStorage>;

/// Digests a plaintext password into its stored form.
#[must_use]
pub fn digest_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// A stored (username, password digest) pair. One credential per username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique username key.
    pub username: String,

    /// Lowercase-hex SHA-256 digest of the password.
    pub password_digest: String,
}

impl Credential {
    /// Creates a credential from a plaintext password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: digest_password(password),
        }
    }

    /// Checks the supplied password against the stored digest.
    ///
    /// The comparison walks the full digest length regardless of where the
    /// first mismatch occurs.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        let supplied = digest_password(password);
        if supplied.len() != self.password_digest.len() {
            return false;
        }
        supplied
            .bytes()
            .zip(self.password_digest.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Storage operations for credentials.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// Find a credential by its exact username.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>>;

    /// Insert or replace the credential for its username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert(&self, credential: Credential) -> AuthResult<()>;

    /// Number of stored credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn count(&self) -> AuthResult<u64>;
}

/// In-memory credential storage for development and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    data: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStorage {
    /// Creates an empty credential storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        Ok(self.data.read().await.get(username).cloned())
    }

    async fn upsert(&self, credential: Credential) -> AuthResult<()> {
        self.data
            .write()
            .await
            .insert(credential.username.clone(), credential);
        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.data.read().await.len() as u64)
    }
}
