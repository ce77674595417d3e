//! HTTP adaptation for a `Facade`.
//!
//! The controller does no validation of its own: it forwards the normalized
//! request to the facade and lets `ApiError`'s conversion turn the facade's
//! error kind into a status code.

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::facade::Facade;
use crate::middleware::{ApiResponse, ApiResult};
use crate::store::{Document, Filter};

/// Transport-neutral view of an inbound request
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
    /// `:id` path parameter, when the route has one
    pub id: Option<String>,
    pub query: HashMap<String, String>,
    /// Parsed JSON body, if any was sent
    pub body: Option<Value>,
}

impl ResourceRequest {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Query parameters as an exact-match filter; `None` when there are none
    fn filter(&self) -> Option<Filter> {
        if self.query.is_empty() {
            return None;
        }
        let filter: Map<String, Value> = self
            .query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Some(filter)
    }

    fn require_id(&self) -> Result<&str, ApiError> {
        self.id
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Missing resource identifier"))
    }

    fn take_body(&mut self) -> Value {
        self.body.take().unwrap_or(Value::Null)
    }
}

#[derive(Clone)]
pub struct Controller {
    facade: Arc<Facade>,
}

impl Controller {
    pub fn new(facade: Arc<Facade>) -> Self {
        Self { facade }
    }

    pub fn facade(&self) -> &Arc<Facade> {
        &self.facade
    }

    /// GET /R
    pub async fn index(&self, req: ResourceRequest) -> ApiResult<Vec<Document>> {
        let documents = self.facade.list(req.filter()).await?;
        Ok(ApiResponse::success(documents))
    }

    /// GET /R/:id
    pub async fn show(&self, req: ResourceRequest) -> ApiResult<Document> {
        let document = self.facade.get(req.require_id()?).await?;
        Ok(ApiResponse::success(document))
    }

    /// POST /R
    pub async fn create(&self, mut req: ResourceRequest) -> ApiResult<Document> {
        let document = self.facade.create(req.take_body()).await?;
        Ok(ApiResponse::created(document))
    }

    /// PUT or PATCH /R/:id
    pub async fn update(&self, mut req: ResourceRequest) -> ApiResult<Document> {
        let body = req.take_body();
        let document = self.facade.update(req.require_id()?, body).await?;
        Ok(ApiResponse::success(document))
    }

    /// DELETE /R/:id, answering with the removed document
    pub async fn destroy(&self, req: ResourceRequest) -> ApiResult<Document> {
        let document = self.facade.delete(req.require_id()?).await?;
        Ok(ApiResponse::success(document))
    }

    /// GET /R/count
    pub async fn count(&self, req: ResourceRequest) -> ApiResult<Value> {
        let count = self.facade.count(req.filter()).await?;
        Ok(ApiResponse::success(json!({ "count": count })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_facade, FailingStore};
    use crate::store::MemoryStore;
    use axum::http::StatusCode;

    fn controller() -> Controller {
        Controller::new(Arc::new(sample_facade(Arc::new(MemoryStore::new()))))
    }

    #[tokio::test]
    async fn walks_the_crud_status_codes() {
        let controller = controller();

        let created = controller
            .create(ResourceRequest::default().with_body(json!({"name": "Ada"})))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = created.data.id.to_string();

        let shown = controller.show(ResourceRequest::with_id(&id)).await.unwrap();
        assert_eq!(shown.status(), StatusCode::OK);
        assert_eq!(shown.data, created.data);

        let updated = controller
            .update(ResourceRequest::with_id(&id).with_body(json!({"age": 31})))
            .await
            .unwrap();
        assert_eq!(updated.data.get("age"), Some(&json!(31)));

        let destroyed = controller.destroy(ResourceRequest::with_id(&id)).await.unwrap();
        assert_eq!(destroyed.status(), StatusCode::OK);

        let err = controller.show(ResourceRequest::with_id(&id)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn maps_validation_failures_to_400() {
        let controller = controller();

        let err = controller
            .create(ResourceRequest::default().with_body(json!({"age": 5})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = controller.create(ResourceRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = controller.show(ResourceRequest::with_id("nope")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = controller.show(ResourceRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn index_uses_query_as_filter() {
        let controller = controller();
        for (name, age) in [("Ada", 36), ("Grace", 85)] {
            controller
                .create(ResourceRequest::default().with_body(json!({"name": name, "age": age})))
                .await
                .unwrap();
        }

        let all = controller.index(ResourceRequest::default()).await.unwrap();
        assert_eq!(all.data.len(), 2);

        let mut query = HashMap::new();
        query.insert("age".to_string(), "85".to_string());
        let some = controller
            .index(ResourceRequest::default().with_query(query.clone()))
            .await
            .unwrap();
        assert_eq!(some.data.len(), 1);

        let counted = controller
            .count(ResourceRequest::default().with_query(query))
            .await
            .unwrap();
        assert_eq!(counted.data, json!({"count": 1}));
    }

    #[tokio::test]
    async fn store_errors_become_500() {
        let controller = Controller::new(Arc::new(sample_facade(Arc::new(FailingStore))));
        let err = controller.index(ResourceRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "An error occurred while processing your request");
    }
}
