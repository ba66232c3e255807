//! Test configuration helpers for loading .env credentials and creating test orchestrators

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use vidquiz::{
    Config, FfmpegTranscoder, Fetcher, PipelineOrchestrator, QuestionGenerator, Transcoder,
    Transcriber, YtDlpFetcher,
};

/// Whether live service credentials are configured (`OPENAI_API_KEY`)
pub fn has_live_credentials() -> bool {
    dotenvy::dotenv().ok();
    std::env::var("OPENAI_API_KEY")
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false)
}

/// Whether both external tools can be found on `PATH`
pub fn has_live_tools() -> bool {
    YtDlpFetcher::from_path().is_some() && FfmpegTranscoder::from_path().is_some()
}

/// Offline configuration whose workspace lives under `root`
pub fn offline_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.temp_dir = root.join("work");
    config.tools.search_path = false;
    config.transcription.api_key = Some("sk-test".to_string());
    config.generation.api_key = Some("sk-test".to_string());
    config
}

/// Build an orchestrator over the given stages
///
/// Returns the orchestrator and temp directory (keep temp_dir alive for test duration)
pub fn orchestrator_with(
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn QuestionGenerator>,
) -> (PipelineOrchestrator, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = offline_config(temp_dir.path());
    let orchestrator =
        PipelineOrchestrator::new(Arc::new(config), fetcher, transcoder, transcriber, generator);
    (orchestrator, temp_dir)
}

/// Create an orchestrator wired to the real tools and services
///
/// Reads `OPENAI_API_KEY` (and optionally `OPENAI_BASE_URL`) from the environment.
pub fn create_live_orchestrator()
-> Result<(PipelineOrchestrator, TempDir), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let temp_dir = TempDir::new()?;
    let mut config = Config::default();
    config.workspace.temp_dir = temp_dir.path().join("work");
    config.apply_env();

    let orchestrator = PipelineOrchestrator::from_config(config)?;
    Ok((orchestrator, temp_dir))
}
