//! Trait for speech-to-text implementations

use crate::error::TranscriptionError;
use crate::types::TranscriptionResult;
use async_trait::async_trait;
use std::path::Path;

/// Turns an audio file into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio at `audio_path`
    ///
    /// Returns the service's text verbatim. A transcript that is empty or only
    /// whitespace is [`TranscriptionError::EmptyResult`], never `Ok`.
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult, TranscriptionError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
