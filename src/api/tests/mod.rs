use super::*;
use crate::Config;
use crate::test_helpers::test_config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Router over production stages whose tools and services do not exist
fn create_test_app() -> (Router, Arc<Config>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    create_app_with(config, temp_dir)
}

fn create_app_with(config: Config, temp_dir: TempDir) -> (Router, Arc<Config>, TempDir) {
    let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone()).unwrap());
    let config = Arc::new(config);
    (create_router(orchestrator, config.clone()), config, temp_dir)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_stops_on_shutdown_signal() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone()).unwrap());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server_with_shutdown(
        orchestrator,
        Arc::new(config),
        async move {
            rx.await.ok();
        },
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bind_failure_is_io_error() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.api.bind_address = occupied.local_addr().unwrap();
    let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone()).unwrap());

    let result = start_api_server(orchestrator, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _config, _temp_dir) = create_test_app();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.api.cors_origins = vec!["http://quiz.local".to_string()];
    let (app, _config, _temp_dir) = create_app_with(config, temp_dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://quiz.local")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://quiz.local"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.api.cors_enabled = false;
    let (app, _config, _temp_dir) = create_app_with(config, temp_dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, _config, _temp_dir) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.api.swagger_ui = false;
    let (app, _config, _temp_dir) = create_app_with(config, temp_dir);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
