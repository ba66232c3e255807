//! Quiz synthesis from a transcript
//!
//! [`ChatQuestionGenerator`] asks an OpenAI-compatible chat completion endpoint for
//! questions and hands the reply to [`parse_questions`], which keeps well-formed
//! items and drops the rest.

mod chat;
mod parser;
mod traits;

pub use chat::ChatQuestionGenerator;
pub use parser::parse_questions;
pub use traits::QuestionGenerator;
