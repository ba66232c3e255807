//! Core types for vidquiz

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for one pipeline run
///
/// Used to derive the per-run working directory, so two concurrent runs can
/// never share an artifact path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random RunId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline state
///
/// Runs move strictly forward:
/// `Idle -> Fetching -> Converting -> Transcribing -> Generating -> CleaningUp -> {Completed, Failed}`.
/// Any working stage may jump straight to `CleaningUp` on failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request accepted, nothing started
    Idle,
    /// Downloading source audio
    Fetching,
    /// Normalizing audio for speech recognition
    Converting,
    /// Speech-to-text
    Transcribing,
    /// Quiz synthesis
    Generating,
    /// Releasing run artifacts
    CleaningUp,
    /// Finished with a question set
    Completed,
    /// Finished with an error
    Failed,
}

impl Stage {
    /// Whether the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: Stage) -> bool {
        use Stage::*;
        match (self, next) {
            (Idle, Fetching)
            | (Fetching, Converting)
            | (Converting, Transcribing)
            | (Transcribing, Generating)
            | (CleaningUp, Completed)
            | (CleaningUp, Failed) => true,
            (Idle | Fetching | Converting | Transcribing | Generating, CleaningUp) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Converting => "converting",
            Stage::Transcribing => "transcribing",
            Stage::Generating => "generating",
            Stage::CleaningUp => "cleaning_up",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Validated inbound request for one run
#[derive(Clone, Debug)]
pub struct PipelineRequest {
    source_url: Url,
    question_count: usize,
}

impl PipelineRequest {
    /// Validate a raw URL and optional question count against the configuration
    ///
    /// The URL must be an absolute `http`/`https` URL. A missing count falls back to
    /// `generation.default_question_count`; an explicit count must be in
    /// `1..=generation.max_question_count`.
    pub fn new(source_url: &str, question_count: Option<usize>, config: &Config) -> Result<Self> {
        let trimmed = source_url.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidRequest("source URL is required".into()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| Error::InvalidRequest(format!("invalid source URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let max = config.generation.max_question_count;
        let count = question_count.unwrap_or(config.generation.default_question_count);
        if count == 0 || count > max {
            return Err(Error::InvalidRequest(format!(
                "question count must be between 1 and {}, got {}",
                max, count
            )));
        }

        Ok(Self {
            source_url: url,
            question_count: count,
        })
    }

    /// The source URL
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    /// Number of questions to request from the generator
    pub fn question_count(&self) -> usize {
        self.question_count
    }
}

/// Kind of temporary artifact produced during a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Audio as produced by the download tool
    RawAudio,
    /// Audio normalized for speech recognition
    ConvertedAudio,
}

impl ArtifactKind {
    /// File stem used inside the run directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            ArtifactKind::RawAudio => "raw",
            ArtifactKind::ConvertedAudio => "converted",
        }
    }
}

/// A temporary file reserved for one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempArtifact {
    /// Location inside the run directory
    pub path: PathBuf,
    /// What the file holds
    pub kind: ArtifactKind,
    /// When the path was reserved
    pub created_at: DateTime<Utc>,
}

/// Text produced by the transcribe stage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptionResult {
    /// Transcript exactly as returned by the speech-to-text service
    pub text: String,
}

/// A single multiple-choice question
///
/// Always has exactly four options and a correct-answer index in `0..=3`.
/// Deserialization enforces both, so an invalid item can never be constructed
/// from generator output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "RawQuizQuestion")]
pub struct QuizQuestion {
    question: String,
    #[schema(value_type = Vec<String>, min_items = 4, max_items = 4)]
    options: [String; 4],
    #[schema(minimum = 0, maximum = 3)]
    correct_answer_index: u8,
}

impl QuizQuestion {
    /// Build a question, rejecting an empty prompt or an out-of-range answer index
    pub fn new(
        question: impl Into<String>,
        options: [String; 4],
        correct_answer_index: u8,
    ) -> Option<Self> {
        let question = question.into();
        if question.trim().is_empty() || correct_answer_index > 3 {
            return None;
        }
        Some(Self {
            question,
            options,
            correct_answer_index,
        })
    }

    /// The question prompt
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The four answer options
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    /// Index of the correct option
    pub fn correct_answer_index(&self) -> u8 {
        self.correct_answer_index
    }

    /// The text of the correct option
    pub fn correct_answer(&self) -> &str {
        &self.options[usize::from(self.correct_answer_index)]
    }
}

/// Unvalidated question item as emitted by a language model
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizQuestion {
    question: Option<String>,
    options: Option<Vec<String>>,
    #[serde(alias = "correct_answer_index")]
    correct_answer_index: Option<i64>,
    #[serde(alias = "correct_answer")]
    correct_answer: Option<i64>,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = String;

    fn try_from(raw: RawQuizQuestion) -> std::result::Result<Self, Self::Error> {
        let question = raw.question.ok_or("missing question")?;
        let options: [String; 4] = raw
            .options
            .ok_or("missing options")?
            .try_into()
            .map_err(|opts: Vec<String>| format!("expected 4 options, got {}", opts.len()))?;
        let index = match (raw.correct_answer_index, raw.correct_answer) {
            (Some(index), Some(other)) if index != other => {
                return Err(format!(
                    "conflicting correct answer indices {} and {}",
                    index, other
                ));
            }
            (Some(index), _) | (None, Some(index)) => index,
            (None, None) => return Err("missing correct answer index".to_string()),
        };
        let index = u8::try_from(index)
            .ok()
            .filter(|i| *i <= 3)
            .ok_or_else(|| format!("correct answer index {} out of range", index))?;

        QuizQuestion::new(question, options, index).ok_or_else(|| "empty question".to_string())
    }
}

/// Ordered questions returned by a successful run
///
/// Insertion order is presentation order. May be shorter than the requested
/// count when the generator produced invalid items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct QuizQuestionSet(Vec<QuizQuestion>);

impl QuizQuestionSet {
    /// Number of questions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no questions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in presentation order
    pub fn iter(&self) -> std::slice::Iter<'_, QuizQuestion> {
        self.0.iter()
    }

    /// Drop questions beyond `len`
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Unwrap into the underlying vector
    pub fn into_inner(self) -> Vec<QuizQuestion> {
        self.0
    }
}

impl From<Vec<QuizQuestion>> for QuizQuestionSet {
    fn from(questions: Vec<QuizQuestion>) -> Self {
        Self(questions)
    }
}

impl FromIterator<QuizQuestion> for QuizQuestionSet {
    fn from_iter<I: IntoIterator<Item = QuizQuestion>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a QuizQuestionSet {
    type Item = &'a QuizQuestion;
    type IntoIter = std::slice::Iter<'a, QuizQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Event emitted during a pipeline run
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run was accepted
    RunStarted {
        /// Run ID
        run_id: RunId,
        /// Source URL being processed
        source_url: String,
        /// Number of questions requested
        question_count: usize,
    },

    /// A run entered a new state
    StageChanged {
        /// Run ID
        run_id: RunId,
        /// The state entered
        stage: Stage,
    },

    /// Run artifacts were released
    CleanupFinished {
        /// Run ID
        run_id: RunId,
        /// Number of artifacts that were removed from disk
        removed: usize,
    },

    /// A run produced a question set
    RunCompleted {
        /// Run ID
        run_id: RunId,
        /// Number of questions produced
        question_count: usize,
    },

    /// A run failed
    RunFailed {
        /// Run ID
        run_id: RunId,
        /// Stage that failed, if the failure came from a stage
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<Stage>,
        /// Failure classification
        code: String,
        /// Human-readable error message
        error: String,
    },
}

/// Which external capabilities are available
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Audio download tool
    pub fetcher: ToolInfo,
    /// Audio conversion tool
    pub transcoder: ToolInfo,
    /// Speech-to-text service
    pub transcriber: String,
    /// Language-generation service
    pub generator: String,
}

/// Information about an external tool
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolInfo {
    /// Implementation name
    pub name: String,
    /// Whether the tool binary was found
    pub available: bool,
}
