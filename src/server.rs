use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{root, ServiceState};
use crate::resources::ResourceRegistry;
use crate::store;

/// Build the HTTP application for a prepared registry.
///
/// A request that exceeds the configured timeout is answered with 408 and its
/// handler future is dropped; a store operation already sent may still apply.
pub fn app(registry: &ResourceRegistry, config: &AppConfig) -> Router {
    let service_state = ServiceState {
        store: registry.store().clone(),
        resources: Arc::new(registry.names()),
    };

    // Keep in step with `resources::RESERVED_NAMES`
    let mut router = Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .with_state(service_state)
        .merge(registry.routes())
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(config.api.request_timeout_secs))),
        );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Connect the store, register resources and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = store::connect(&config.store)
        .await
        .context("failed to connect document store")?;

    let registry = ResourceRegistry::from_config(store, &config).context("failed to register resources")?;
    registry
        .prepare_all()
        .await
        .context("failed to prepare resource collections")?;

    let app = app(&registry, &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("People API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
