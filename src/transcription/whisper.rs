//! OpenAI-compatible speech-to-text client

use super::traits::Transcriber;
use crate::config::TranscriptionConfig;
use crate::error::{Error, Result, TranscriptionError};
use crate::types::TranscriptionResult;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Client for `POST {base_url}/audio/transcriptions`
///
/// The audio file is streamed from disk as a multipart upload rather than read
/// into memory first.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

impl WhisperTranscriber {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Build from configuration; fails if no API key is configured
    pub fn from_config(config: &TranscriptionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "transcription API key is not configured".into(),
                key: Some("transcription.api_key".into()),
            })?;
        Ok(Self::new(api_key, &config.base_url, &config.model))
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, test servers)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    async fn file_part(audio_path: &Path) -> std::result::Result<Part, TranscriptionError> {
        let unsupported = |e: std::io::Error| TranscriptionError::UnsupportedInput {
            reason: format!("cannot read {}: {}", audio_path.display(), e),
        };

        let file = tokio::fs::File::open(audio_path).await.map_err(unsupported)?;
        let length = file.metadata().await.map_err(unsupported)?.len();

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        Part::stream_with_length(body, length)
            .file_name(file_name)
            .mime_str(audio_mime_type(audio_path))
            .map_err(|e| TranscriptionError::UnsupportedInput {
                reason: format!("mime: {}", e),
            })
    }
}

/// MIME type for an upload, from the file extension the transcoder wrote
fn audio_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Statuses that mean the service rejected this particular audio
fn is_input_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE
    )
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
    ) -> std::result::Result<TranscriptionResult, TranscriptionError> {
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", Self::file_part(audio_path).await?);

        debug!(model = %self.model, ?audio_path, "sending audio to speech-to-text service");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ServiceUnavailable {
                reason: format!("request: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let reason = format!("status {}: {}", status, body.trim());
            return Err(if is_input_rejection(status) {
                TranscriptionError::UnsupportedInput { reason }
            } else {
                TranscriptionError::ServiceUnavailable { reason }
            });
        }

        let body: TranscriptionResponse =
            response
                .json()
                .await
                .map_err(|e| TranscriptionError::ServiceUnavailable {
                    reason: format!("body: {}", e),
                })?;

        let text = body.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(TranscriptionError::EmptyResult);
        }

        info!(chars = text.len(), "transcription completed");
        Ok(TranscriptionResult { text })
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}
