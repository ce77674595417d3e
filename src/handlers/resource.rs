use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::controller::{Controller, ResourceRequest};
use crate::middleware::ApiResult;
use crate::store::Document;

/// Binds `/<resource>` and `/<resource>/:id` to a controller's handlers
pub struct ResourceRouter {
    controller: Controller,
    extra: Vec<(String, MethodRouter<Controller>)>,
}

impl ResourceRouter {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            extra: Vec::new(),
        }
    }

    /// URL prefix the resource is mounted at
    pub fn prefix(&self) -> String {
        format!("/{}", self.controller.facade().name())
    }

    /// Add a route relative to the resource prefix (e.g. `/count`)
    pub fn route(mut self, path: &str, method_router: MethodRouter<Controller>) -> Self {
        self.extra.push((path.to_string(), method_router));
        self
    }

    pub fn into_router(self) -> Router {
        let prefix = self.prefix();
        let router = Router::new()
            .route(&prefix, get(index).post(create))
            .route(
                &format!("{}/:id", prefix),
                get(show).put(update).patch(update).delete(destroy),
            );

        self.extra
            .into_iter()
            .fold(router, |router, (path, method_router)| {
                router.route(&format!("{}{}", prefix, path), method_router)
            })
            .with_state(self.controller)
    }
}

/// GET /:resource - List documents, query parameters act as an exact-match filter
pub async fn index(
    State(controller): State<Controller>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Document>> {
    controller.index(ResourceRequest::default().with_query(query)).await
}

/// GET /:resource/:id - Get a single document by ID
pub async fn show(State(controller): State<Controller>, Path(id): Path<String>) -> ApiResult<Document> {
    controller.show(ResourceRequest::with_id(id)).await
}

/// POST /:resource - Create a document
pub async fn create(
    State(controller): State<Controller>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let Json(body) = payload?;
    controller.create(ResourceRequest::default().with_body(body)).await
}

/// PUT|PATCH /:resource/:id - Merge fields into a document
pub async fn update(
    State(controller): State<Controller>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let Json(body) = payload?;
    controller.update(ResourceRequest::with_id(id).with_body(body)).await
}

/// DELETE /:resource/:id - Delete a document
pub async fn destroy(State(controller): State<Controller>, Path(id): Path<String>) -> ApiResult<Document> {
    controller.destroy(ResourceRequest::with_id(id)).await
}

/// GET /:resource/count - Count documents matching the query filter
pub async fn count(
    State(controller): State<Controller>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    controller.count(ResourceRequest::default().with_query(query)).await
}
