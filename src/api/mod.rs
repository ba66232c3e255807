//! REST API server module
//!
//! Exposes the quiz pipeline over HTTP with an OpenAPI 3.1 description.

use crate::{Config, PipelineOrchestrator, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Quiz
/// - `POST /generate-quiz` - Run the pipeline for one video
///
/// ## System
/// - `GET /capabilities` - Which tools and services are wired in
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream of run progress
pub fn create_router(orchestrator: Arc<PipelineOrchestrator>, config: Arc<Config>) -> Router {
    let state = AppState::new(orchestrator);

    let router = Router::new()
        // Quiz
        .route("/generate-quiz", post(routes::generate_quiz))
        // System
        .route("/capabilities", get(routes::get_capabilities))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. See [`start_api_server_with_shutdown`] for a
/// server that stops on a signal.
///
/// # Example
///
/// ```no_run
/// use vidquiz::{Config, PipelineOrchestrator};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.apply_env();
/// let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone())?);
///
/// vidquiz::api::start_api_server(orchestrator, Arc::new(config)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    orchestrator: Arc<PipelineOrchestrator>,
    config: Arc<Config>,
) -> Result<()> {
    start_api_server_with_shutdown(orchestrator, config, std::future::pending()).await
}

/// Start the API server and stop accepting connections once `shutdown` resolves
///
/// In-flight requests are allowed to finish, so their runs still clean up.
pub async fn start_api_server_with_shutdown<F>(
    orchestrator: Arc<PipelineOrchestrator>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(orchestrator, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().map_err(crate::error::Error::Io)?,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
