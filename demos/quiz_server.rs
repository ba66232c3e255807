//! REST API server demo
//!
//! Runs vidquiz behind its HTTP API until Ctrl+C / SIGTERM.
//!
//! Requires `yt-dlp` and `ffmpeg` on `PATH` and `OPENAI_API_KEY` in the
//! environment (or a `.env` file). `OPENAI_BASE_URL` points both services at an
//! OpenAI-compatible server; `VIDQUIZ_BIND` overrides the listen address.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:3210/swagger-ui
//! - Generate a quiz via POST http://localhost:3210/generate-quiz
//! - Stream run progress via GET http://localhost:3210/events

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vidquiz::{Config, PipelineOrchestrator, serve_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidquiz=info,tower_http=info")),
        )
        .init();

    let mut config = Config::default();
    config.apply_env();
    if let Ok(bind) = std::env::var("VIDQUIZ_BIND") {
        config.api.bind_address = bind.parse()?;
    }

    let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone())?);
    let capabilities = orchestrator.capabilities();
    let address = config.api.bind_address;

    println!("Starting vidquiz REST API server");
    println!("  yt-dlp available: {}", capabilities.fetcher.available);
    println!("  ffmpeg available: {}", capabilities.transcoder.available);
    println!("Swagger UI: http://{address}/swagger-ui");
    println!("Events stream: http://{address}/events");
    println!();
    println!("Example command:");
    println!("  curl -X POST http://{address}/generate-quiz \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"url\": \"https://www.youtube.com/watch?v=jNQXAC9IVRw\", \"questionCount\": 5}}'"
    );

    serve_with_shutdown(orchestrator, Arc::new(config)).await?;

    Ok(())
}
