use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::facade::Facade;
use crate::resources::ResourceRegistry;
use crate::schema::{FieldDef, FieldType, SchemaDescriptor};
use crate::server;
use crate::store::{Document, DocumentId, DocumentStore, Filter, MemoryStore, StoreError};

/// In-process application over a fresh memory store
pub struct TestContext {
    store: Option<Arc<MemoryStore>>,
    app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = Self::build(store.clone());
        Self {
            store: Some(store),
            app,
        }
    }

    /// Application whose store fails every call; it has no memory store
    pub fn failing() -> Self {
        Self {
            store: None,
            app: Self::build(Arc::new(FailingStore)),
        }
    }

    /// Memory store behind the application, when it has one
    pub fn memory(&self) -> Option<&MemoryStore> {
        self.store.as_deref()
    }

    fn build(store: Arc<dyn DocumentStore>) -> Router {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let registry = ResourceRegistry::from_config(store, &config).expect("registry");
        server::app(&registry, &config)
    }

    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// POST a raw body with a JSON content type
    pub async fn raw_post(&self, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.app().oneshot(request).await.unwrap()
    }
}

/// Send one request through the router and decode the JSON response
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// `{name: string required, age: number default 0, email: string}` in "people"
pub fn sample_facade(store: Arc<dyn DocumentStore>) -> Facade {
    let schema = SchemaDescriptor::new(
        "person",
        Some("people".to_string()),
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::optional("age", FieldType::Number).with_default(0),
            FieldDef::optional("email", FieldType::String),
        ],
    )
    .unwrap();
    Facade::new(schema, store)
}

/// Store double that fails every operation
pub struct FailingStore;

impl FailingStore {
    fn error() -> StoreError {
        StoreError::ConnectionError("store unreachable".to_string())
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn insert(&self, _collection: &str, _fields: Map<String, Value>) -> Result<Document, StoreError> {
        Err(Self::error())
    }

    async fn find(&self, _collection: &str, _filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Err(Self::error())
    }

    async fn find_one(&self, _collection: &str, _id: DocumentId) -> Result<Option<Document>, StoreError> {
        Err(Self::error())
    }

    async fn update_one(
        &self,
        _collection: &str,
        _id: DocumentId,
        _patch: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        Err(Self::error())
    }

    async fn delete_one(&self, _collection: &str, _id: DocumentId) -> Result<Option<Document>, StoreError> {
        Err(Self::error())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_is_only_exposed_when_backing_the_app() {
        let ctx = TestContext::new();
        send(&ctx.app(), Method::POST, "/person", Some(serde_json::json!({"name": "Ada"}))).await;
        assert_eq!(ctx.memory().expect("memory-backed").len("people").await, 1);

        assert!(TestContext::failing().memory().is_none());
    }
}
