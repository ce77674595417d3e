use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::store::DocumentStore;

/// State shared by the service-level routes
#[derive(Clone)]
pub struct ServiceState {
    pub store: Arc<dyn DocumentStore>,
    pub resources: Arc<Vec<String>>,
}

/// GET / - Service description and mounted resources
pub async fn root(State(state): State<ServiceState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let endpoints: Vec<String> = state
        .resources
        .iter()
        .map(|name| format!("/{name}[/:id]"))
        .collect();

    Json(json!({
        "name": "People API",
        "version": version,
        "description": "Schema-driven document CRUD service",
        "resources": state.resources.as_ref(),
        "endpoints": endpoints,
    }))
}

/// GET /health - Store connectivity check
pub async fn health(State(state): State<ServiceState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": state.store.backend(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": state.store.backend(),
                    "error": "store unavailable",
                })),
            )
        }
    }
}
