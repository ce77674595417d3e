//! Document persistence behind the `DocumentStore` trait.
//!
//! Collections are addressed by name; documents by a store-assigned UUID.
//! Filters are exact-match maps of field name to expected value.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DocumentId = Uuid;

/// Exact-match predicate: every key must equal the document's field value
pub type Filter = Map<String, Value>;

/// A stored document: identifier plus declared fields, serialized flat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: DocumentId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Check the document against an exact-match filter
    pub fn matches(&self, filter: &Filter) -> bool {
        filter.iter().all(|(key, expected)| {
            self.fields
                .get(key)
                .map(|actual| values_equal(actual, expected))
                .unwrap_or(false)
        })
    }

    /// Merge a patch: `null` removes the key, anything else overwrites it
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if value.is_null() {
                self.fields.remove(&key);
            } else {
                self.fields.insert(key, value);
            }
        }
    }

    pub fn into_value(self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        map.extend(self.fields);
        Value::Object(map)
    }
}

/// Filter equality shared by every backend. Numbers compare by value, so `36`
/// equals `36.0`; arrays and objects must match element for element.
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).map(|y| values_equal(x, y)).unwrap_or(false))
        }
        _ => actual == expected,
    }
}

/// Errors from a `DocumentStore` backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collection-oriented persistence consumed by every `Facade`.
///
/// Implementations must be safe to share across tasks; each call is an
/// independent round-trip and no call holds the store exclusively.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Prepare a collection for use. Called once per resource at startup.
    async fn ensure_collection(&self, _collection: &str) -> Result<(), StoreError> {
        Ok(())
    }

    /// Insert a new document; the store assigns the identifier
    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Document, StoreError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Merge `patch` into the document: named keys overwrite, others are kept.
    /// A `null` value removes the key, so cleared fields look never set.
    async fn update_one(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError>;

    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Build the store selected by configuration
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => Ok(Arc::new(PgStore::connect(config).await?)),
    }
}
