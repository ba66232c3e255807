//! yt-dlp backed audio download

use super::traits::Fetcher;
use crate::config::Config;
use crate::error::FetchError;
use crate::utils::{ToolError, file_size, resolve_binary, run_tool};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Audio downloader using the external `yt-dlp` binary
///
/// Runs `yt-dlp -x --audio-format <fmt> --audio-quality <q> -o <dest> <url>`.
/// The process and any converter it spawns are killed when the timeout elapses.
///
/// # Examples
///
/// ```no_run
/// use vidquiz::fetch::YtDlpFetcher;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = YtDlpFetcher::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    available: bool,
    audio_format: String,
    audio_quality: String,
}

impl YtDlpFetcher {
    /// Create a fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            available: true,
            audio_format: "mp3".into(),
            audio_quality: "0".into(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Build from configuration
    ///
    /// When no binary can be resolved the fetcher still falls back to plain
    /// `yt-dlp`, reports itself unavailable, and fails at invocation time.
    pub fn from_config(config: &Config) -> Self {
        let resolved = resolve_binary(
            config.tools.yt_dlp_path.as_deref(),
            "yt-dlp",
            config.tools.search_path,
        );
        let available = resolved.is_some();
        let mut fetcher = Self::new(resolved.unwrap_or_else(|| PathBuf::from("yt-dlp")))
            .with_audio(&config.fetch.audio_format, &config.fetch.audio_quality);
        fetcher.available = available;
        fetcher
    }

    /// Override the requested audio format and quality
    pub fn with_audio(mut self, format: &str, quality: &str) -> Self {
        self.audio_format = format.to_string();
        self.audio_quality = quality.to_string();
        self
    }

    /// The binary this fetcher invokes
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, source_url: &str, destination: &Path) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .arg("--no-playlist")
            .arg("--no-progress")
            .arg("-x")
            .arg("--audio-format")
            .arg(&self.audio_format)
            .arg("--audio-quality")
            .arg(&self.audio_quality)
            .arg("-o")
            .arg(destination)
            .arg("--")
            .arg(source_url);
        command
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        source_url: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        info!(source_url, ?destination, ?timeout, "downloading audio");

        let mut command = self.command(source_url, destination);
        let output = match run_tool(&mut command, Some(timeout)).await {
            Ok(output) => output,
            Err(ToolError::TimedOut) => {
                warn!(source_url, ?timeout, "yt-dlp timed out, process killed");
                return Err(FetchError::Timeout { after: timeout });
            }
            Err(ToolError::Spawn(e)) => {
                return Err(FetchError::InvocationFailed {
                    exit_info: format!("failed to execute yt-dlp: {}", e),
                });
            }
            Err(ToolError::Wait(e)) => {
                return Err(FetchError::InvocationFailed {
                    exit_info: format!("failed to wait for yt-dlp: {}", e),
                });
            }
        };

        debug!(
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "yt-dlp finished"
        );

        if !output.status.success() {
            return Err(FetchError::InvocationFailed {
                exit_info: output.exit_info(),
            });
        }

        match file_size(destination).await {
            Some(size) if size > 0 => {
                info!(?destination, size, "audio downloaded");
                Ok(())
            }
            _ => Err(FetchError::OutputMissing {
                path: destination.to_path_buf(),
            }),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
