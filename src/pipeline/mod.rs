//! Pipeline orchestration
//!
//! Runs one request through the stages in strict order:
//! 1. Fetch - download source audio into a run-scoped artifact
//! 2. Convert - normalize it for speech recognition
//! 3. Transcribe - speech-to-text
//! 4. Generate - quiz synthesis from the transcript
//!
//! Whatever happens (stage error, cancellation, deadline), the run ends with a
//! single cleanup pass that deletes every artifact it allocated.

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::error::{Error, GenerationError, Result, ToHttpStatus, TranscriptionError};
use crate::fetch::{Fetcher, YtDlpFetcher};
use crate::generation::{ChatQuestionGenerator, QuestionGenerator};
use crate::transcode::{FfmpegTranscoder, Transcoder};
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::types::{
    ArtifactKind, Capabilities, Event, PipelineRequest, QuizQuestionSet, RunId, Stage, ToolInfo,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};


/// Sequences the pipeline stages for each request
///
/// Cheap to share behind an `Arc`; every call to [`run`](Self::run) is an
/// independent run with its own [`RunId`] and working directory.
pub struct PipelineOrchestrator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn QuestionGenerator>,
    event_tx: broadcast::Sender<Event>,
}

impl PipelineOrchestrator {
    /// Assemble an orchestrator from explicit stage implementations
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn Fetcher>,
        transcoder: Arc<dyn Transcoder>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn QuestionGenerator>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(1000);
        Self {
            config,
            fetcher,
            transcoder,
            transcriber,
            generator,
            event_tx,
        }
    }

    /// Build the production stages (yt-dlp, ffmpeg, OpenAI-compatible services)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration is invalid, e.g. a missing API key.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let fetcher = YtDlpFetcher::from_config(&config);
        let transcoder = FfmpegTranscoder::from_config(&config);
        if !fetcher.is_available() {
            warn!("yt-dlp not found; downloads will fail until it is installed");
        }
        if !transcoder.is_available() {
            warn!("ffmpeg not found; conversions will fail until it is installed");
        }
        let transcriber = WhisperTranscriber::from_config(&config.transcription)?;
        let generator = ChatQuestionGenerator::from_config(&config.generation)?;

        Ok(Self::new(
            Arc::new(config),
            Arc::new(fetcher),
            Arc::new(transcoder),
            Arc::new(transcriber),
            Arc::new(generator),
        ))
    }

    /// The configuration this orchestrator runs with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Subscribe to run events
    ///
    /// Slow subscribers lose the oldest events rather than blocking runs.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Which stage implementations are wired in, and whether their tools exist
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            fetcher: ToolInfo {
                name: self.fetcher.name().to_string(),
                available: self.fetcher.is_available(),
            },
            transcoder: ToolInfo {
                name: self.transcoder.name().to_string(),
                available: self.transcoder.is_available(),
            },
            transcriber: self.transcriber.name().to_string(),
            generator: self.generator.name().to_string(),
        }
    }

    /// Validate raw inputs and run the pipeline
    pub async fn generate_quiz(
        &self,
        source_url: &str,
        question_count: Option<usize>,
        cancel: CancellationToken,
    ) -> Result<QuizQuestionSet> {
        let request = PipelineRequest::new(source_url, question_count, &self.config)?;
        self.run(request, cancel).await
    }

    /// Run one request to completion
    ///
    /// Returns the question set, or the error of the first stage that failed.
    /// `cancel` and the configured request deadline abort whichever stage is in
    /// flight (external tools are killed) and still clean up.
    pub async fn run(
        &self,
        request: PipelineRequest,
        cancel: CancellationToken,
    ) -> Result<QuizQuestionSet> {
        let mut store = ArtifactStore::new(&self.config.workspace.temp_dir, RunId::new());
        self.run_with_store(request, &mut store, cancel).await
    }

    /// [`run`](Self::run) with a caller-provided artifact store
    pub async fn run_with_store(
        &self,
        request: PipelineRequest,
        store: &mut ArtifactStore,
        cancel: CancellationToken,
    ) -> Result<QuizQuestionSet> {
        let run_id = store.run_id();
        info!(
            run_id = %run_id,
            source_url = %request.source_url(),
            question_count = request.question_count(),
            "starting pipeline run"
        );
        self.emit_event(Event::RunStarted {
            run_id,
            source_url: request.source_url().to_string(),
            question_count: request.question_count(),
        });

        let mut tracker = StageTracker::new(run_id, &self.event_tx);
        let outcome = {
            let stages = self.execute(&request, store, &mut tracker);
            let bounded = async {
                match self.config.pipeline.request_timeout {
                    Some(limit) => tokio::time::timeout(limit, stages)
                        .await
                        .unwrap_or(Err(Error::DeadlineExceeded { after: limit })),
                    None => stages.await,
                }
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                result = bounded => result,
            }
        };
        let interrupted_at = tracker.current();

        tracker.advance_or_warn(Stage::CleaningUp);
        let summary = store.release_all().await;
        self.emit_event(Event::CleanupFinished {
            run_id,
            removed: summary.removed,
        });

        match outcome {
            Ok(questions) => {
                tracker.advance_or_warn(Stage::Completed);
                info!(run_id = %run_id, questions = questions.len(), "pipeline run completed");
                self.emit_event(Event::RunCompleted {
                    run_id,
                    question_count: questions.len(),
                });
                Ok(questions)
            }
            Err(e) => {
                tracker.advance_or_warn(Stage::Failed);
                let stage = e.stage().or(Some(interrupted_at)).filter(|s| *s != Stage::Idle);
                error!(
                    run_id = %run_id,
                    stage = ?stage,
                    code = e.error_code(),
                    error = %e,
                    "pipeline run failed"
                );
                self.emit_event(Event::RunFailed {
                    run_id,
                    stage,
                    code: e.error_code().to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &PipelineRequest,
        store: &mut ArtifactStore,
        tracker: &mut StageTracker<'_>,
    ) -> Result<QuizQuestionSet> {
        tracker.advance(Stage::Fetching)?;
        let raw = store
            .allocate(ArtifactKind::RawAudio, &self.config.fetch.audio_format)
            .await?;
        self.fetcher
            .fetch(
                request.source_url().as_str(),
                &raw.path,
                self.config.fetch.timeout,
            )
            .await?;

        tracker.advance(Stage::Converting)?;
        let converted = store
            .allocate(ArtifactKind::ConvertedAudio, &self.config.transcode.extension)
            .await?;
        self.transcoder.convert(&raw.path, &converted.path).await?;

        tracker.advance(Stage::Transcribing)?;
        let transcript = self.transcriber.transcribe(&converted.path).await?;
        if transcript.text.trim().is_empty() {
            return Err(TranscriptionError::EmptyResult.into());
        }

        tracker.advance(Stage::Generating)?;
        let mut questions = self
            .generator
            .generate(&transcript.text, request.question_count())
            .await?;
        if questions.is_empty() {
            return Err(GenerationError::EmptyResult.into());
        }
        questions.truncate(request.question_count());
        Ok(questions)
    }

    fn emit_event(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}

/// Current state of one run; rejects backward or repeated transitions
struct StageTracker<'a> {
    run_id: RunId,
    current: Stage,
    event_tx: &'a broadcast::Sender<Event>,
}

impl<'a> StageTracker<'a> {
    fn new(run_id: RunId, event_tx: &'a broadcast::Sender<Event>) -> Self {
        Self {
            run_id,
            current: Stage::Idle,
            event_tx,
        }
    }

    fn current(&self) -> Stage {
        self.current
    }

    fn advance(&mut self, next: Stage) -> Result<()> {
        if !self.current.can_transition_to(next) {
            return Err(Error::Other(format!(
                "illegal stage transition {} -> {}",
                self.current, next
            )));
        }
        info!(run_id = %self.run_id, from = %self.current, to = %next, "stage transition");
        self.current = next;
        self.event_tx
            .send(Event::StageChanged {
                run_id: self.run_id,
                stage: next,
            })
            .ok();
        Ok(())
    }

    fn advance_or_warn(&mut self, next: Stage) {
        if let Err(e) = self.advance(next) {
            warn!(run_id = %self.run_id, error = %e, "stage transition rejected");
        }
    }
}
