use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Row};
use tracing::{debug, info};

use crate::error::Result;

/// Keyed JSON documents grouped into collections. Writes are last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn set_document(&self, collection: &str, key: &str, body: &Value) -> Result<()>;

    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Value>>;
}

/// Document store backed by a single `documents` table holding JSONB bodies.
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                doc_key TEXT NOT NULL,
                body JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, doc_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("Document table ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn set_document(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, doc_key, body, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (collection, doc_key) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(sqlx::types::Json(body))
        .execute(&self.pool)
        .await?;
        debug!("Wrote document {}/{}", collection, key);
        Ok(())
    }

    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND doc_key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: sqlx::types::Json<Value> = row.try_get("body")?;
                Ok(Some(body.0))
            }
            None => Ok(None),
        }
    }
}
