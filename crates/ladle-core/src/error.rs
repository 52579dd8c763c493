use thiserror::Error;

/// Core error types for Ladle operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid recipe: {message}")]
    InvalidRecipe { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidRecipe error
    pub fn invalid_recipe(message: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            message: message.into(),
        }
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRecipe { .. } | Self::JsonError(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
