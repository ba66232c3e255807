//! Error types for vidquiz
//!
//! This module provides the error taxonomy for the quiz pipeline:
//! - One error enum per stage (fetch, convert, transcribe, generate)
//! - A top-level [`Error`] that every public operation returns
//! - HTTP status code mapping and structured JSON error bodies for the API

use crate::types::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for vidquiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidquiz
///
/// Stage errors are carried verbatim so callers always see the classification
/// of the stage that failed first.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "transcription.api_key")
        key: Option<String>,
    },

    /// The inbound request was rejected before any stage ran
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Fetch stage failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Convert stage failed
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// Transcribe stage failed
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Generate stage failed
    #[error("question generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The run was cancelled by the caller (e.g. client disconnect)
    #[error("run cancelled")]
    Cancelled,

    /// The overall per-request deadline elapsed
    #[error("run exceeded its deadline of {}s", after.as_secs())]
    DeadlineExceeded {
        /// The configured deadline
        after: Duration,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The pipeline stage this error originated from, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Fetch(_) => Some(Stage::Fetching),
            Error::Convert(_) => Some(Stage::Converting),
            Error::Transcription(_) => Some(Stage::Transcribing),
            Error::Generation(_) => Some(Stage::Generating),
            _ => None,
        }
    }
}

/// Errors from the fetch stage (audio download)
#[derive(Debug, Error)]
pub enum FetchError {
    /// The download did not finish within the configured timeout; the tool was killed
    #[error("download timed out after {}s", after.as_secs())]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// The download tool could not be started or exited unsuccessfully
    #[error("download tool failed: {exit_info}")]
    InvocationFailed {
        /// Exit code and trailing stderr, or the spawn error
        exit_info: String,
    },

    /// The tool reported success but the destination is missing or empty
    #[error("download produced no audio at {path}")]
    OutputMissing {
        /// The expected destination path
        path: PathBuf,
    },
}

/// Errors from the convert stage (audio normalization)
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The conversion tool could not be started or exited unsuccessfully
    #[error("conversion tool failed: {exit_info}")]
    InvocationFailed {
        /// Exit code and trailing stderr, or the spawn error
        exit_info: String,
    },

    /// The conversion output is missing or zero bytes
    #[error("conversion produced an empty file at {path}")]
    EmptyOutput {
        /// The expected output path
        path: PathBuf,
    },
}

/// Errors from the transcribe stage (speech-to-text)
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The speech-to-text service could not be reached or refused the request
    #[error("transcription service unavailable: {reason}")]
    ServiceUnavailable {
        /// What went wrong talking to the service
        reason: String,
    },

    /// The audio could not be read or was rejected as unprocessable
    #[error("unsupported audio input: {reason}")]
    UnsupportedInput {
        /// Why the input was rejected
        reason: String,
    },

    /// The service returned no text
    #[error("transcription returned no text")]
    EmptyResult,
}

/// Errors from the generate stage (quiz synthesis)
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The language-generation service could not be reached or refused the request
    #[error("generation service unavailable: {reason}")]
    ServiceUnavailable {
        /// What went wrong talking to the service
        reason: String,
    },

    /// The response could not be parsed as structured quiz data at all
    #[error("malformed generation response: {reason}")]
    MalformedResponse {
        /// Parser diagnostics
        reason: String,
    },

    /// No well-formed question survived filtering
    #[error("generation returned no valid questions")]
    EmptyResult,
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "fetch_timeout",
///     "message": "fetch failed: download timed out after 120s",
///     "details": {
///       "stage": "fetching",
///       "timeout_secs": 120
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable failure classification (e.g., "fetch_timeout")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context (stage, paths, tool exit info)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,

            // 422 Unprocessable Entity - the source media itself is the problem
            Error::Fetch(FetchError::InvocationFailed { .. }) => 422,
            Error::Convert(_) => 422,
            Error::Transcription(TranscriptionError::UnsupportedInput { .. }) => 422,
            Error::Transcription(TranscriptionError::EmptyResult) => 422,
            Error::Generation(GenerationError::EmptyResult) => 422,

            // 502 Bad Gateway - a capability answered with something unusable
            Error::Fetch(FetchError::OutputMissing { .. }) => 502,
            Error::Generation(GenerationError::MalformedResponse { .. }) => 502,

            // 503 Service Unavailable
            Error::Transcription(TranscriptionError::ServiceUnavailable { .. }) => 503,
            Error::Generation(GenerationError::ServiceUnavailable { .. }) => 503,

            // 504 Gateway Timeout
            Error::Fetch(FetchError::Timeout { .. }) => 504,
            Error::DeadlineExceeded { .. } => 504,

            // 499 Client Closed Request (nginx convention)
            Error::Cancelled => 499,

            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Fetch(e) => match e {
                FetchError::Timeout { .. } => "fetch_timeout",
                FetchError::InvocationFailed { .. } => "fetch_invocation_failed",
                FetchError::OutputMissing { .. } => "fetch_output_missing",
            },
            Error::Convert(e) => match e {
                ConvertError::InvocationFailed { .. } => "convert_invocation_failed",
                ConvertError::EmptyOutput { .. } => "convert_empty_output",
            },
            Error::Transcription(e) => match e {
                TranscriptionError::ServiceUnavailable { .. } => {
                    "transcription_service_unavailable"
                }
                TranscriptionError::UnsupportedInput { .. } => "transcription_unsupported_input",
                TranscriptionError::EmptyResult => "transcription_empty_result",
            },
            Error::Generation(e) => match e {
                GenerationError::ServiceUnavailable { .. } => "generation_service_unavailable",
                GenerationError::MalformedResponse { .. } => "generation_malformed_response",
                GenerationError::EmptyResult => "generation_empty_result",
            },
            Error::Cancelled => "cancelled",
            Error::DeadlineExceeded { .. } => "deadline_exceeded",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();
        let stage = error.stage();

        let details = match &error {
            Error::Fetch(FetchError::Timeout { after }) => Some(serde_json::json!({
                "stage": stage,
                "timeout_secs": after.as_secs(),
            })),
            Error::Fetch(FetchError::InvocationFailed { exit_info })
            | Error::Convert(ConvertError::InvocationFailed { exit_info }) => {
                Some(serde_json::json!({
                    "stage": stage,
                    "exit_info": exit_info,
                }))
            }
            Error::Fetch(FetchError::OutputMissing { path })
            | Error::Convert(ConvertError::EmptyOutput { path }) => Some(serde_json::json!({
                "stage": stage,
                "path": path,
            })),
            Error::DeadlineExceeded { after } => Some(serde_json::json!({
                "timeout_secs": after.as_secs(),
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => stage.map(|stage| serde_json::json!({ "stage": stage })),
        };

        let mut api_error = ApiError::new(code, message);
        api_error.error.details = details;
        api_error
    }
}
