//! Parsing of language-model quiz replies

use crate::error::GenerationError;
use crate::types::{QuizQuestion, QuizQuestionSet};
use serde_json::Value;
use tracing::debug;

/// Parse a generator reply into at most `requested_count` questions
///
/// The envelope is lenient: a bare JSON array, an object with a `questions` array,
/// or either one wrapped in a Markdown code fence. Items are strict: anything that
/// does not deserialize into a [`QuizQuestion`] is dropped.
///
/// # Errors
///
/// - [`GenerationError::MalformedResponse`] if the reply is not JSON or has no question array
/// - [`GenerationError::EmptyResult`] if no item survives filtering
pub fn parse_questions(
    content: &str,
    requested_count: usize,
) -> Result<QuizQuestionSet, GenerationError> {
    let json = strip_code_fence(content);
    let value: Value =
        serde_json::from_str(json).map_err(|e| GenerationError::MalformedResponse {
            reason: format!("not valid JSON: {}", e),
        })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(GenerationError::MalformedResponse {
                    reason: "object reply has no \"questions\" array".into(),
                });
            }
        },
        other => {
            return Err(GenerationError::MalformedResponse {
                reason: format!("expected an array of questions, got {}", json_kind(&other)),
            });
        }
    };

    let total = items.len();
    let mut questions: QuizQuestionSet = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<QuizQuestion>(item) {
            Ok(q) => Some(q),
            Err(e) => {
                debug!(index = i, error = %e, "dropping invalid question");
                None
            }
        })
        .collect();

    if questions.is_empty() {
        return Err(GenerationError::EmptyResult);
    }
    if questions.len() < total {
        debug!(kept = questions.len(), total, "some generated questions were invalid");
    }

    questions.truncate(requested_count);
    Ok(questions)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
