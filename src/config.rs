//! Configuration types for vidquiz

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for the quiz pipeline
///
/// Fields are organized into sub-configs, one per concern:
/// - [`workspace`](WorkspaceConfig) - where per-run artifacts live
/// - [`tools`](ToolsConfig) - external binary paths
/// - [`fetch`](FetchConfig) / [`transcode`](TranscodeConfig) - external tool behavior
/// - [`transcription`](TranscriptionConfig) / [`generation`](GenerationConfig) - remote services
/// - [`pipeline`](PipelineConfig) - run-wide limits
/// - [`api`](ApiConfig) - REST server
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Temporary workspace settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Audio download settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Audio normalization settings
    #[serde(default)]
    pub transcode: TranscodeConfig,

    /// Speech-to-text service settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Quiz generation service settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Run-wide limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Fill service credentials and endpoints from the environment
    ///
    /// - `OPENAI_API_KEY` sets both service API keys when they are unset
    /// - `OPENAI_BASE_URL` overrides both service base URLs
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.trim().is_empty()
        {
            if self.transcription.api_key.is_none() {
                self.transcription.api_key = Some(key.clone());
            }
            if self.generation.api_key.is_none() {
                self.generation.api_key = Some(key);
            }
        }

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL")
            && !base_url.trim().is_empty()
        {
            self.transcription.base_url = base_url.clone();
            self.generation.base_url = base_url;
        }
    }

    /// Check settings that would otherwise only fail mid-run
    pub fn validate(&self) -> Result<()> {
        if self
            .transcription
            .api_key
            .as_deref()
            .is_none_or(|k| k.trim().is_empty())
        {
            return Err(config_error(
                "transcription API key is not configured",
                "transcription.api_key",
            ));
        }
        if self
            .generation
            .api_key
            .as_deref()
            .is_none_or(|k| k.trim().is_empty())
        {
            return Err(config_error(
                "generation API key is not configured",
                "generation.api_key",
            ));
        }
        if self.fetch.timeout.is_zero() {
            return Err(config_error("fetch timeout must be non-zero", "fetch.timeout"));
        }
        if self.transcode.sample_rate == 0 {
            return Err(config_error(
                "sample rate must be non-zero",
                "transcode.sample_rate",
            ));
        }
        if self.transcode.channels == 0 {
            return Err(config_error(
                "channel count must be non-zero",
                "transcode.channels",
            ));
        }
        if self.generation.max_question_count == 0 {
            return Err(config_error(
                "max question count must be non-zero",
                "generation.max_question_count",
            ));
        }
        if self.generation.default_question_count == 0
            || self.generation.default_question_count > self.generation.max_question_count
        {
            return Err(config_error(
                "default question count must be between 1 and max_question_count",
                "generation.default_question_count",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

/// Temporary workspace configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceConfig {
    /// Parent directory for per-run working directories (default: "./temp")
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Audio download configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FetchConfig {
    /// Time allowed for the download tool before it is killed (default: 120 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,

    /// Audio format passed to the download tool (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Audio quality passed to the download tool, 0 = best (default: "0")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            audio_format: default_audio_format(),
            audio_quality: default_audio_quality(),
        }
    }
}

/// Audio normalization configuration
///
/// Defaults match the speech-to-text input contract: 16 kHz mono MP3.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscodeConfig {
    /// Output sample rate in Hz (default: 16000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output channel count (default: 1)
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// Output audio codec (default: "libmp3lame")
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Output file extension (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub extension: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            codec: default_codec(),
            extension: default_audio_format(),
        }
    }
}

/// Speech-to-text service configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible API (default: "https://api.openai.com/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model name (default: "whisper-1")
    #[serde(default = "default_transcription_model")]
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_transcription_model(),
        }
    }
}

/// Quiz generation service configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API (default: "https://api.openai.com/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model name (default: "gpt-4")
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Sampling temperature (None = service default)
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Questions generated when the request does not say (default: 5)
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,

    /// Upper bound on requested questions (default: 20)
    #[serde(default = "default_max_question_count")]
    pub max_question_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_generation_model(),
            temperature: None,
            default_question_count: default_question_count(),
            max_question_count: default_max_question_count(),
        }
    }
}

/// Run-wide limits
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PipelineConfig {
    /// Wall-clock budget for a whole run, None = unbounded (default: 600 seconds)
    #[serde(default = "default_request_timeout", with = "optional_duration_serde")]
    #[schema(value_type = Option<u64>)]
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3210)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./temp")
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_audio_quality() -> String {
    "0".into()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u8 {
    1
}

fn default_codec() -> String {
    "libmp3lame".into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_transcription_model() -> String {
    "whisper-1".into()
}

fn default_generation_model() -> String {
    "gpt-4".into()
}

fn default_question_count() -> usize {
    5
}

fn default_max_question_count() -> usize {
    20
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(600))
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3210))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (as seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
