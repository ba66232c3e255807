//! Trait for question generation implementations

use crate::error::GenerationError;
use crate::types::QuizQuestionSet;
use async_trait::async_trait;

/// Produces multiple-choice questions from transcript text
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate up to `requested_count` questions about `transcript`
    ///
    /// Invalid items in the service's reply are dropped, so the set may be shorter
    /// than requested. It is never empty: zero surviving items is
    /// [`GenerationError::EmptyResult`].
    async fn generate(
        &self,
        transcript: &str,
        requested_count: usize,
    ) -> Result<QuizQuestionSet, GenerationError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
