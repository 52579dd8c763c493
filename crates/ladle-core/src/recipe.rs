use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::CoreError;

/// A persisted recipe.
///
/// `id` and `published_at` are assigned by the store layer at creation and
/// never change afterwards; every other field is client-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

impl Recipe {
    /// Returns `true` if the recipe carries the given tag, ignoring ASCII case.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Client-supplied recipe fields, before identity assignment.
///
/// Used both for create (the draft becomes a new [`Recipe`]) and for update
/// (the draft replaces every mutable field of an existing one).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl RecipeDraft {
    /// Validates the required fields.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRecipe` when the name is blank or no
    /// ingredients are given.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_recipe("name must not be empty"));
        }
        if self.ingredients.is_empty() {
            return Err(CoreError::invalid_recipe(
                "at least one ingredient is required",
            ));
        }
        Ok(())
    }

    /// Materializes the draft into a persisted recipe with the given identity
    /// and publication timestamp.
    #[must_use]
    pub fn into_recipe(self, id: String, published_at: OffsetDateTime) -> Recipe {
        Recipe {
            id,
            name: self.name,
            tags: self.tags,
            ingredients: self.ingredients,
            instructions: self.instructions,
            published_at,
        }
    }

    /// Applies the draft onto an existing recipe, preserving its identity and
    /// publication timestamp.
    pub fn apply_to(self, recipe: &mut Recipe) {
        recipe.name = self.name;
        recipe.tags = self.tags;
        recipe.ingredients = self.ingredients;
        recipe.instructions = self.instructions;
    }
}
