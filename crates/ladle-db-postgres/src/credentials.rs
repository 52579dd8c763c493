use async_trait::async_trait;
use sqlx::{PgPool, Row};

use ladle_auth::{AuthError, AuthResult, Credential, CredentialStorage};

/// PostgreSQL-backed credential storage.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStorage {
    pool: PgPool,
}

impl PostgresCredentialStorage {
    /// Wraps an already-connected pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn auth_err(e: sqlx::Error) -> AuthError {
    AuthError::storage(e.to_string())
}

#[async_trait]
impl CredentialStorage for PostgresCredentialStorage {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        let row = sqlx::query("SELECT username, password_digest FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(auth_err)?;

        row.map(|row| {
            Ok(Credential {
                username: row.try_get("username").map_err(auth_err)?,
                password_digest: row.try_get("password_digest").map_err(auth_err)?,
            })
        })
        .transpose()
    }

    async fn upsert(&self, credential: Credential) -> AuthResult<()> {
        sqlx::query(
            "INSERT INTO users (username, password_digest) VALUES ($1, $2) \
             ON CONFLICT (username) DO UPDATE SET password_digest = EXCLUDED.password_digest",
        )
        .bind(&credential.username)
        .bind(&credential.password_digest)
        .execute(&self.pool)
        .await
        .map_err(auth_err)?;
        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        let row = sqlx::query("SELECT count(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(auth_err)?;
        let n: i64 = row.try_get("n").map_err(auth_err)?;
        Ok(n as u64)
    }
}
