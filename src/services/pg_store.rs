//! PostgreSQL 文档存储
//!
//! 每个集合的文档以 JSONB 形式存于 `documents` 表，`seq` 保留插入顺序；
//! 计数器存于 `counters` 表，通过 upsert 原子递增

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::store::{with_id, DocumentStore};
use crate::config::StorageConfig;
use crate::error::ServiceResult;

const CREATE_DOCUMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq        BIGSERIAL PRIMARY KEY,
    collection TEXT  NOT NULL,
    id         TEXT  NOT NULL,
    body       JSONB NOT NULL,
    UNIQUE (collection, id)
)"#;

const CREATE_COUNTERS: &str = r#"
CREATE TABLE IF NOT EXISTS counters (
    name  TEXT PRIMARY KEY,
    value BIGINT NOT NULL
)"#;

const NEXT_SEQUENCE: &str = r#"
INSERT INTO counters (name, value) VALUES ($1, 1)
ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
RETURNING value"#;

/// PostgreSQL 文档存储
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 建立连接池并确保表结构存在
    pub async fn connect(config: &StorageConfig) -> ServiceResult<Self> {
        log::info!("连接 PostgreSQL 文档存储...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        log::info!("PostgreSQL 文档存储就绪");
        Ok(store)
    }

    async fn ensure_schema(&self) -> ServiceResult<()> {
        sqlx::query(CREATE_DOCUMENTS).execute(&self.pool).await?;
        sqlx::query(CREATE_COUNTERS).execute(&self.pool).await?;
        Ok(())
    }
}

fn body_of(row: &sqlx::postgres::PgRow) -> ServiceResult<Value> {
    let Json(body): Json<Value> = row.try_get("body")?;
    Ok(body)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &str, doc: Value) -> ServiceResult<String> {
        let id = Uuid::new_v4().to_string();
        let doc = with_id(doc, &id)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> ServiceResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(body_of).transpose()
    }

    async fn list(&self, collection: &str) -> ServiceResult<Vec<Value>> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY seq")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(body_of).collect()
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> ServiceResult<bool> {
        let doc = with_id(doc, id)?;
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> ServiceResult<Option<Value>> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body -> $2 = $3 ORDER BY seq LIMIT 1",
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value.clone()))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(body_of).transpose()
    }

    async fn delete_one(&self, collection: &str, field: &str, value: &Value) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"DELETE FROM documents WHERE seq = (
                SELECT seq FROM documents
                WHERE collection = $1 AND body -> $2 = $3
                ORDER BY seq LIMIT 1
            )"#,
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value.clone()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_sequence(&self, name: &str) -> ServiceResult<i64> {
        let value: i64 = sqlx::query_scalar(NEXT_SEQUENCE)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(value)
    }
}
