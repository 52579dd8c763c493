//! Storage error types for the recipe storage abstraction layer.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested recipe was not found.
    #[error("Recipe not found: {id}")]
    NotFound {
        /// The ID of the recipe that was not found.
        id: String,
    },

    /// The recipe data is invalid.
    #[error("Invalid recipe: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// The durable backend could not be reached or answered with a failure.
    #[error("Store unavailable: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the backend itself failed, as opposed to the
    /// request being unsatisfiable.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ConnectionError { .. } | Self::Internal { .. })
    }
}
