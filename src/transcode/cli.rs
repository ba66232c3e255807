//! ffmpeg backed audio conversion

use super::traits::Transcoder;
use crate::config::{Config, TranscodeConfig};
use crate::error::ConvertError;
use crate::utils::{ToolError, file_size, resolve_binary, run_tool};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Audio converter using the external `ffmpeg` binary
///
/// Runs `ffmpeg -nostdin -y -i <in> -ar <rate> -ac <channels> -c:a <codec> <out>`.
/// No timeout is applied here; the run-wide deadline bounds it.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary_path: PathBuf,
    available: bool,
    sample_rate: u32,
    channels: u8,
    codec: String,
}

impl FfmpegTranscoder {
    /// Create a transcoder with an explicit binary path and default output settings
    pub fn new(binary_path: PathBuf) -> Self {
        Self::with_settings(binary_path, &TranscodeConfig::default())
    }

    /// Attempt to find ffmpeg in PATH
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Build from configuration, falling back to plain `ffmpeg` (reported unavailable)
    pub fn from_config(config: &Config) -> Self {
        let resolved = resolve_binary(
            config.tools.ffmpeg_path.as_deref(),
            "ffmpeg",
            config.tools.search_path,
        );
        let available = resolved.is_some();
        let mut transcoder = Self::with_settings(
            resolved.unwrap_or_else(|| PathBuf::from("ffmpeg")),
            &config.transcode,
        );
        transcoder.available = available;
        transcoder
    }

    fn with_settings(binary_path: PathBuf, settings: &TranscodeConfig) -> Self {
        Self {
            binary_path,
            available: true,
            sample_rate: settings.sample_rate,
            channels: settings.channels,
            codec: settings.codec.clone(),
        }
    }

    /// The binary this transcoder invokes
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .arg("-nostdin")
            .arg("-hide_banner")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-ac")
            .arg(self.channels.to_string())
            .arg("-c:a")
            .arg(&self.codec)
            .arg(output);
        command
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        info!(?input, ?output, sample_rate = self.sample_rate, "converting audio");

        let mut command = self.command(input, output);
        let result = match run_tool(&mut command, None).await {
            Ok(result) => result,
            Err(ToolError::Spawn(e)) => {
                return Err(ConvertError::InvocationFailed {
                    exit_info: format!("failed to execute ffmpeg: {}", e),
                });
            }
            Err(ToolError::Wait(e)) => {
                return Err(ConvertError::InvocationFailed {
                    exit_info: format!("failed to wait for ffmpeg: {}", e),
                });
            }
            Err(ToolError::TimedOut) => {
                return Err(ConvertError::InvocationFailed {
                    exit_info: "ffmpeg timed out".into(),
                });
            }
        };

        debug!(
            stderr = %String::from_utf8_lossy(&result.stderr),
            "ffmpeg finished"
        );

        if !result.status.success() {
            return Err(ConvertError::InvocationFailed {
                exit_info: result.exit_info(),
            });
        }

        match file_size(output).await {
            Some(size) if size > 0 => {
                info!(?output, size, "audio converted");
                Ok(())
            }
            _ => Err(ConvertError::EmptyOutput {
                path: output.to_path_buf(),
            }),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
