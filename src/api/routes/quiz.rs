//! Quiz generation handler.

use super::{GenerateQuizRequest, GenerateQuizResponse};
use crate::api::AppState;
use crate::error::Error;
use crate::types::PipelineRequest;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tokio_util::sync::CancellationToken;

/// POST /generate-quiz - Turn a video into a multiple-choice quiz
///
/// The run executes on its own task. If the client disconnects, this handler is
/// dropped, the drop guard cancels the run, and the run still cleans up.
#[utoipa::path(
    post,
    path = "/generate-quiz",
    tag = "quiz",
    request_body = GenerateQuizRequest,
    responses(
        (status = 200, description = "Quiz generated", body = GenerateQuizResponse),
        (status = 400, description = "Missing or invalid URL or question count", body = crate::error::ApiError),
        (status = 422, description = "The source media could not be processed", body = crate::error::ApiError),
        (status = 502, description = "A capability returned unusable output", body = crate::error::ApiError),
        (status = 503, description = "Transcription or generation service unavailable", body = crate::error::ApiError),
        (status = 504, description = "Download or overall deadline exceeded", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> Result<Json<GenerateQuizResponse>, Error> {
    let Json(body) = payload.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let request = PipelineRequest::new(
        body.url.as_deref().unwrap_or_default(),
        body.question_count,
        state.orchestrator.config(),
    )?;

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let orchestrator = state.orchestrator.clone();
    let run = tokio::spawn(async move { orchestrator.run(request, cancel).await });

    let result = run
        .await
        .map_err(|e| Error::Other(format!("pipeline task failed: {}", e)))?;
    let _ = guard.disarm();

    let questions = result?;
    Ok(Json(GenerateQuizResponse { questions }))
}
