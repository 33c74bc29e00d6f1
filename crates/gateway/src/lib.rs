//! HTTP API gateway for Inkwell.
//!
//! Exposes the learning platform REST endpoints plus a health check.
//! Built on Axum; every handler delegates to `inkwell-service`.

pub mod api;
pub mod error;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use inkwell_config::{AppConfig, CorsConfig};
use inkwell_service::Services;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub services: Services,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router: API routes, health check, and HTTP layers.
///
/// Layers applied:
/// - CORS from `[cors]`
/// - Request body size limit from `server.body_limit_bytes`
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(cors_layer(&config.cors))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// `"*"` anywhere in the origin list opens the API to every origin
/// (without credentials). Otherwise only the listed origins are allowed
/// and credentials are permitted.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.max_age_secs));

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Start the gateway HTTP server and run until Ctrl-C.
pub async fn start(config: AppConfig, services: Services) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(GatewayState { services });
    let app = build_router(state, &config);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
