//! Audio normalization for speech recognition
//!
//! [`FfmpegTranscoder`] re-encodes whatever the fetch stage produced into the format
//! the speech-to-text service expects (16 kHz, mono, MP3 by default).

mod cli;
mod traits;

pub use cli::FfmpegTranscoder;
pub use traits::Transcoder;
