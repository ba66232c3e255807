//! Route handlers for the REST API
//!
//! - [`quiz`] - quiz generation
//! - [`system`] - health, capabilities, events, OpenAPI

use crate::types::QuizQuestionSet;
use serde::{Deserialize, Serialize};

mod quiz;
mod system;

pub use quiz::*;
pub use system::*;

/// Request body for POST /generate-quiz
///
/// Accepts both the short field names (`url`, `questionCount`) and the long
/// ones (`sourceURL`, `requestedQuestionCount`).
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    /// Absolute http(s) URL of the video
    #[serde(default, alias = "sourceURL", alias = "sourceUrl")]
    pub url: Option<String>,

    /// Number of questions to generate (default: 5)
    #[serde(default, alias = "requestedQuestionCount")]
    pub question_count: Option<usize>,
}

/// Response body for POST /generate-quiz
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GenerateQuizResponse {
    /// Questions in presentation order
    pub questions: QuizQuestionSet,
}
