//! OpenAI-compatible chat completion client for quiz generation

use super::parser::parse_questions;
use super::traits::QuestionGenerator;
use crate::config::GenerationConfig;
use crate::error::{Error, GenerationError, Result};
use crate::types::QuizQuestionSet;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Client for `POST {base_url}/chat/completions`
#[derive(Debug, Clone)]
pub struct ChatQuestionGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatQuestionGenerator {
    /// Create a generator talking to `base_url` with the given chat model
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Build from configuration; fails if no API key is configured
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "generation API key is not configured".into(),
                key: Some("generation.api_key".into()),
            })?;
        let mut generator = Self::new(api_key, &config.base_url, &config.model);
        generator.temperature = config.temperature;
        Ok(generator)
    }

    /// Replace the default HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body(&self, transcript: &str, requested_count: usize) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instructions(requested_count) },
                { "role": "user", "content": transcript },
            ],
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

/// The fixed instruction contract sent with every transcript
fn instructions(requested_count: usize) -> String {
    format!(
        "You are a helpful AI that generates quiz questions based on video transcripts. \
         Generate {requested_count} multiple-choice questions with 4 options each. \
         Format the response as a JSON array of objects, where each object has a \
         \"question\" (string), \"options\" (array of exactly 4 strings), and \
         \"correctAnswerIndex\" (index of the correct option, 0-based) property. \
         Respond with the JSON array only."
    )
}

#[async_trait]
impl QuestionGenerator for ChatQuestionGenerator {
    async fn generate(
        &self,
        transcript: &str,
        requested_count: usize,
    ) -> std::result::Result<QuizQuestionSet, GenerationError> {
        debug!(model = %self.model, requested_count, "requesting quiz questions");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(transcript, requested_count))
            .send()
            .await
            .map_err(|e| GenerationError::ServiceUnavailable {
                reason: format!("request: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationError::ServiceUnavailable {
                reason: format!("status {}: {}", status, body.trim()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::ServiceUnavailable {
                reason: format!("body: {}", e),
            })?;
        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| GenerationError::MalformedResponse {
                reason: format!("unexpected completion envelope: {}", e),
            })?;

        // No content means no questions
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| "[]".to_string());

        let questions = parse_questions(&content, requested_count)?;
        info!(
            requested_count,
            produced = questions.len(),
            "quiz questions generated"
        );
        Ok(questions)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}
