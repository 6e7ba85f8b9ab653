//! REST facade exposing a site's global settings (title, URLs, timezone,
//! permalink structure, ...) over an injected key/value store.
//!
//! The facade is a declarative mapping: a static field registry ties each
//! external setting name to a validation record and an internal storage key,
//! and the read/update pipeline applies that mapping per request.

pub mod api;
pub mod authz;
pub mod config;
pub mod error;
pub mod facade;
pub mod registry;
pub mod sanitize;
pub mod state;
pub mod store;

use axum::{
    body::Body,
    http::{HeaderValue, Request as AxumRequest},
    response::IntoResponse,
    Router,
};
use std::{
    path::PathBuf,
    sync::Arc,
    time::Instant,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use state::AppState;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    api::site_routes().with_state(state)
}

/// Middleware attaching a request ID and a tracing span to every request.
async fn trace_requests(
    mut req: AxumRequest<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        http.method = %method,
        url.path = %path,
    );

    req.extensions_mut().insert(request_id);

    async move {
        let mut response = next.run(req).await;
        let elapsed = start_time.elapsed();

        if let Ok(header) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("X-Request-ID", header);
        }

        info!(
            http.response.duration = ?elapsed,
            http.status_code = response.status().as_u16(),
            "Finished processing request"
        );

        response
    }
    .instrument(span)
    .await
}

/// Load configuration, wire state and build the router with its middleware
/// stack.
pub fn run(config_path_override: Option<PathBuf>) -> Result<(Router, AppConfig)> {
    info!("Starting site settings API...");

    let config = setup_configuration(config_path_override)?;

    let state = Arc::new(AppState::new(config.clone()));
    info!(
        registry.fields = state.facade.registry().len(),
        registry.mapped = state.facade.registry().mapped_len(),
        server.port = config.server.port,
        "Application state initialized"
    );

    let app = create_router(state).layer(axum::middleware::from_fn(trace_requests));

    Ok((app, config))
}

fn setup_configuration(config_path_override: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = config_path_override.unwrap_or_else(|| {
        std::env::var("CONFIG_PATH").map_or_else(|_| PathBuf::from("config.yaml"), PathBuf::from)
    });

    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    config::load_config(&config_path).map_err(|e| {
        tracing::error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration. Exiting."
        );
        e
    })
}
