use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::AdminCredential;
use crate::error::StoreError;

/// Read access to admin credentials, plus the startup upsert.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminCredential>, StoreError>;
    async fn upsert(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminCredential>, StoreError> {
        let row = sqlx::query_as::<_, AdminCredential>(
            r#"
            SELECT password_hash
            FROM admin
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO admin (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
