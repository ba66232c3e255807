//! In-process stage implementations for driving the orchestrator without
//! external tools or network services

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vidquiz::{
    ConvertError, FetchError, Fetcher, GenerationError, QuestionGenerator, QuizQuestion,
    QuizQuestionSet, Transcoder, TranscriptionError, TranscriptionResult, Transcriber,
};

/// Writes a fixed payload to the destination, or fails as configured
pub struct StaticFetcher {
    pub payload: Vec<u8>,
    pub fail_with: Option<String>,
    pub delay: Duration,
}

impl StaticFetcher {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            payload: b"ID3 raw audio".to_vec(),
            fail_with: None,
            delay: Duration::ZERO,
        })
    }

    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            payload: Vec::new(),
            fail_with: Some(stderr.to_string()),
            delay: Duration::ZERO,
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            payload: b"ID3 raw audio".to_vec(),
            fail_with: None,
            delay,
        })
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(
        &self,
        _source_url: &str,
        destination: &Path,
        _timeout: Duration,
    ) -> Result<(), FetchError> {
        tokio::time::sleep(self.delay).await;
        if let Some(stderr) = &self.fail_with {
            return Err(FetchError::InvocationFailed {
                exit_info: format!("exit status: 1: {stderr}"),
            });
        }
        tokio::fs::write(destination, &self.payload)
            .await
            .map_err(|e| FetchError::InvocationFailed {
                exit_info: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Copies the input to the output unchanged
pub struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| ConvertError::InvocationFailed {
                exit_info: e.to_string(),
            })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Returns a fixed transcript and counts how often it was called
pub struct FixedTranscriber {
    pub text: String,
    pub calls: AtomicUsize,
}

impl FixedTranscriber {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !audio_path.exists() {
            return Err(TranscriptionError::UnsupportedInput {
                reason: format!("{} does not exist", audio_path.display()),
            });
        }
        Ok(TranscriptionResult {
            text: self.text.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Produces `available` numbered questions, recording the transcript it saw
pub struct NumberedGenerator {
    pub available: usize,
    pub seen_transcript: std::sync::Mutex<Option<String>>,
}

impl NumberedGenerator {
    pub fn new(available: usize) -> Arc<Self> {
        Arc::new(Self {
            available,
            seen_transcript: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl QuestionGenerator for NumberedGenerator {
    async fn generate(
        &self,
        transcript: &str,
        requested_count: usize,
    ) -> Result<QuizQuestionSet, GenerationError> {
        if let Ok(mut seen) = self.seen_transcript.lock() {
            *seen = Some(transcript.to_string());
        }
        let set: QuizQuestionSet = (0..self.available.min(requested_count))
            .filter_map(|i| {
                QuizQuestion::new(
                    format!("Question {i}?"),
                    ["a".into(), "b".into(), "c".into(), "d".into()],
                    (i % 4) as u8,
                )
            })
            .collect();
        if set.is_empty() {
            return Err(GenerationError::EmptyResult);
        }
        Ok(set)
    }

    fn name(&self) -> &'static str {
        "numbered"
    }
}
