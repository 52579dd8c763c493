pub mod error;
pub mod id;
pub mod recipe;

pub use error::{CoreError, Result};
pub use id::generate_id;
pub use recipe::{Recipe, RecipeDraft};
