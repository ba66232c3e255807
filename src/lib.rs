//! # vidquiz
//!
//! Turns the spoken content of a remote video into a multiple-choice quiz.
//!
//! A run downloads the audio track with `yt-dlp`, converts it to 16 kHz mono MP3
//! with `ffmpeg`, transcribes it through a Whisper-compatible endpoint and asks a
//! chat-completions model for questions. Every temporary file a run creates is
//! removed before the run returns, whether it succeeded, failed or was cancelled.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidquiz::{Config, PipelineOrchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.apply_env();
//!
//!     let orchestrator = PipelineOrchestrator::from_config(config)?;
//!
//!     // Subscribe to progress events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let questions = orchestrator
//!         .generate_quiz(
//!             "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!             Some(5),
//!             CancellationToken::new(),
//!         )
//!         .await?;
//!     for question in questions.iter() {
//!         println!("{}", question.question());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Per-run temporary file bookkeeping
pub mod artifacts;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Audio download stage
pub mod fetch;
/// Quiz generation stage
pub mod generation;
/// Run coordination
pub mod pipeline;
/// Audio conversion stage
pub mod transcode;
/// Speech-to-text stage
pub mod transcription;
/// Core types
pub mod types;
/// External process helpers
pub(crate) mod utils;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use artifacts::{ArtifactStore, ReleaseSummary};
pub use config::Config;
pub use error::{
    ApiError, ConvertError, Error, ErrorDetail, FetchError, GenerationError, Result,
    ToHttpStatus, TranscriptionError,
};
pub use fetch::{Fetcher, YtDlpFetcher};
pub use generation::{ChatQuestionGenerator, QuestionGenerator};
pub use pipeline::PipelineOrchestrator;
pub use transcode::{FfmpegTranscoder, Transcoder};
pub use transcription::{Transcriber, WhisperTranscriber};
pub use types::{
    ArtifactKind, Capabilities, Event, PipelineRequest, QuizQuestion, QuizQuestionSet, RunId,
    Stage, TempArtifact, ToolInfo, TranscriptionResult,
};

/// Serve the REST API until a termination signal arrives.
///
/// Stops accepting connections on the signal and lets in-flight runs finish
/// their cleanup before returning.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use vidquiz::{Config, PipelineOrchestrator, serve_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut config = Config::default();
///     config.apply_env();
///     let orchestrator = Arc::new(PipelineOrchestrator::from_config(config.clone())?);
///
///     serve_with_shutdown(orchestrator, Arc::new(config)).await?;
///
///     Ok(())
/// }
/// ```
pub async fn serve_with_shutdown(
    orchestrator: std::sync::Arc<PipelineOrchestrator>,
    config: std::sync::Arc<Config>,
) -> Result<()> {
    api::start_api_server_with_shutdown(orchestrator, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
