use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;

use ladle_core::{Recipe, RecipeDraft, generate_id};
use ladle_storage::{RecipeStore, StorageError};

/// PostgreSQL-backed recipe storage.
///
/// `list_all` orders by id; UUIDv7 identities make that creation order.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Wraps an already-connected pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StorageError::connection_error(e.to_string()),
        other => StorageError::internal(other.to_string()),
    }
}

fn row_to_recipe(row: &PgRow) -> Result<Recipe, StorageError> {
    Ok(Recipe {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        tags: row.try_get("tags").map_err(map_sqlx_error)?,
        ingredients: row.try_get("ingredients").map_err(map_sqlx_error)?,
        instructions: row.try_get("instructions").map_err(map_sqlx_error)?,
        published_at: row.try_get("published_at").map_err(map_sqlx_error)?,
    })
}

const RECIPE_COLUMNS: &str = "id, name, tags, ingredients, instructions, published_at";

#[async_trait]
impl RecipeStore for PostgresStorage {
    async fn insert(&self, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let recipe = draft.into_recipe(generate_id(), OffsetDateTime::now_utc());
        sqlx::query(
            "INSERT INTO recipes (id, name, tags, ingredients, instructions, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.tags)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.published_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(recipe)
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_recipe).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    async fn update_by_id(&self, id: &str, draft: RecipeDraft) -> Result<Recipe, StorageError> {
        draft
            .validate()
            .map_err(|e| StorageError::invalid_record(e.to_string()))?;

        let row = sqlx::query(&format!(
            "UPDATE recipes SET name = $2, tags = $3, ingredients = $4, instructions = $5 \
             WHERE id = $1 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.tags)
        .bind(&draft.ingredients)
        .bind(&draft.instructions)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row_to_recipe(&row),
            None => Err(StorageError::not_found(id)),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(id));
        }
        Ok(())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes \
             WHERE EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = lower($1)) \
             ORDER BY id"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_recipe).collect()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
