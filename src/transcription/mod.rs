//! Speech-to-text
//!
//! [`WhisperTranscriber`] talks to an OpenAI-compatible `/audio/transcriptions`
//! endpoint. The pipeline only sees the [`Transcriber`] trait.

mod traits;
mod whisper;

pub use traits::Transcriber;
pub use whisper::WhisperTranscriber;
