//! PostgreSQL implementation of ProfileStore
//!
//! One row per user: the profile document is kept as JSONB with its
//! document keys unchanged, so it stays readable by other consumers.

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::{debug, error};

use profile_core::repositories::ProfileStore;
use profile_core::{ProfilePatch, StoreError, UserId, UserProfile};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS user_profiles (
        id          TEXT PRIMARY KEY,
        document    JSONB NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("ensure_schema", e))?;
        Ok(())
    }
}

fn map_db_error(operation: &str, e: sqlx::Error) -> StoreError {
    error!("Profile store {} failed: {:?}", operation, e);
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
            StoreError::InvalidDocument(e.to_string())
        }
        _ => StoreError::DatabaseError(e.to_string()),
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query_as::<_, (Json<UserProfile>,)>(
            "SELECT document FROM user_profiles WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get", e))?;

        Ok(row.map(|(Json(document),)| document))
    }

    async fn create(&self, id: &UserId, profile: &UserProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, document)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET document = EXCLUDED.document, updated_at = NOW()
            "#,
        )
        .bind(id.as_str())
        .bind(Json(profile))
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("create", e))?;

        debug!("Profile document written: {}", id);
        Ok(())
    }

    async fn update(&self, id: &UserId, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("update", e))?;

        let row = sqlx::query_as::<_, (Json<UserProfile>,)>(
            "SELECT document FROM user_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("update", e))?;

        let Some((Json(mut document),)) = row else {
            return Err(StoreError::NotFound(id.clone()));
        };
        patch.apply_to(&mut document);

        sqlx::query("UPDATE user_profiles SET document = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_str())
            .bind(Json(&document))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("update", e))?;

        tx.commit().await.map_err(|e| map_db_error("update", e))?;

        debug!("Profile document updated: {} {:?}", id, patch.field_paths());
        Ok(())
    }
}
