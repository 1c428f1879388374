//! 文档存储
//!
//! 账户、交易与计数器的持久化边界。文档为 JSON 对象，主键字段为 `_id`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::pg_store::PgStore;
use crate::config::StorageConfig;
use crate::error::{ServiceError, ServiceResult};

/// 文档主键字段
pub const ID_FIELD: &str = "_id";

/// 文档存储接口
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 插入文档，返回新生成的 ID
    async fn insert(&self, collection: &str, doc: Value) -> ServiceResult<String>;

    /// 按 ID 读取
    async fn get(&self, collection: &str, id: &str) -> ServiceResult<Option<Value>>;

    /// 按插入顺序列出全部文档
    async fn list(&self, collection: &str) -> ServiceResult<Vec<Value>>;

    /// 按 ID 整体替换（保留 ID），返回是否命中
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> ServiceResult<bool>;

    /// 按 ID 删除，返回是否命中
    async fn delete(&self, collection: &str, id: &str) -> ServiceResult<bool>;

    /// 按字段值查找第一条文档
    async fn find_one(&self, collection: &str, field: &str, value: &Value)
        -> ServiceResult<Option<Value>>;

    /// 按字段值删除第一条文档，返回是否命中
    async fn delete_one(&self, collection: &str, field: &str, value: &Value) -> ServiceResult<bool>;

    /// 原子递增计数器并返回新值（首次调用返回 1）
    async fn next_sequence(&self, name: &str) -> ServiceResult<i64>;
}

#[derive(Default)]
struct Collections {
    docs: HashMap<String, Vec<Value>>,
    counters: HashMap<String, i64>,
}

/// 进程内文档存储
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 按配置选择存储：配置了连接串使用 PostgreSQL，否则使用进程内存储
pub async fn open(config: &StorageConfig) -> ServiceResult<Arc<dyn DocumentStore>> {
    if config.database_url.is_empty() {
        log::warn!("未配置 database_url，使用进程内存储，重启后数据丢失");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(PgStore::connect(config).await?))
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(|v| v.as_str())
}

pub(super) fn with_id(mut doc: Value, id: &str) -> ServiceResult<Value> {
    match doc.as_object_mut() {
        Some(obj) => {
            obj.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Ok(doc)
        }
        None => Err(ServiceError::Storage("文档必须是 JSON 对象".to_string())),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Value) -> ServiceResult<String> {
        let id = Uuid::new_v4().to_string();
        let doc = with_id(doc, &id)?;
        let mut inner = self.inner.write().await;
        inner.docs.entry(collection.to_string()).or_default().push(doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> ServiceResult<Option<Value>> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| doc_id(d) == Some(id)))
            .cloned())
    }

    async fn list(&self, collection: &str) -> ServiceResult<Vec<Value>> {
        let inner = self.inner.read().await;
        Ok(inner.docs.get(collection).cloned().unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> ServiceResult<bool> {
        let doc = with_id(doc, id)?;
        let mut inner = self.inner.write().await;
        let slot = inner
            .docs
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| doc_id(d) == Some(id)));
        match slot {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> ServiceResult<bool> {
        self.delete_one(collection, ID_FIELD, &Value::String(id.to_string()))
            .await
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> ServiceResult<Option<Value>> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.get(field) == Some(value)))
            .cloned())
    }

    async fn delete_one(&self, collection: &str, field: &str, value: &Value) -> ServiceResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(docs) = inner.docs.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| d.get(field) == Some(value)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn next_sequence(&self, name: &str) -> ServiceResult<i64> {
        let mut inner = self.inner.write().await;
        let counter = inner.counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_replace_delete() {
        let store = MemoryStore::new();
        let id = store.insert("accounts", json!({"name": "cash"})).await.unwrap();

        let doc = store.get("accounts", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "cash");
        assert_eq!(doc[ID_FIELD], id.as_str());

        assert!(store.replace("accounts", &id, json!({"name": "bank"})).await.unwrap());
        let doc = store.get("accounts", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "bank");
        assert_eq!(doc[ID_FIELD], id.as_str());

        assert!(store.delete("accounts", &id).await.unwrap());
        assert!(store.get("accounts", &id).await.unwrap().is_none());
        assert!(!store.delete("accounts", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_missing_returns_false() {
        let store = MemoryStore::new();
        assert!(!store.replace("accounts", "nope", json!({})).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        for n in 1..=3 {
            store.insert("transactions", json!({"serialNumber": n})).await.unwrap();
        }
        let docs = store.list("transactions").await.unwrap();
        let serials: Vec<i64> = docs.iter().map(|d| d["serialNumber"].as_i64().unwrap()).collect();
        assert_eq!(serials, vec![1, 2, 3]);
        assert!(store.list("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_and_delete_by_field() {
        let store = MemoryStore::new();
        store.insert("transactions", json!({"serialNumber": 7})).await.unwrap();

        let found = store.find_one("transactions", "serialNumber", &json!(7)).await.unwrap();
        assert!(found.is_some());
        assert!(store.delete_one("transactions", "serialNumber", &json!(7)).await.unwrap());
        assert!(store.find_one("transactions", "serialNumber", &json!(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_sequence_is_ascending() {
        let store = MemoryStore::new();
        assert_eq!(store.next_sequence("transaction_serial").await.unwrap(), 1);
        assert_eq!(store.next_sequence("transaction_serial").await.unwrap(), 2);
        assert_eq!(store.next_sequence("other").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_without_url_uses_memory() {
        let store = open(&StorageConfig::default()).await.unwrap();
        assert_eq!(store.next_sequence("transaction_serial").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_with_bad_url_fails() {
        let config = StorageConfig {
            database_url: "not a database url".to_string(),
            ..StorageConfig::default()
        };
        let err = open(&config).await.err().unwrap();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn test_insert_rejects_non_object() {
        let store = MemoryStore::new();
        let err = store.insert("accounts", json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
