//! Storage abstraction layer for the Ladle server.
//!
//! Defines the [`RecipeStore`] contract that every durable backend
//! implements, and the [`StorageError`] taxonomy surfaced by them.

pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::{DynRecipeStore, RecipeStore};
