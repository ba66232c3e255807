//! Audio download from a remote source
//!
//! The [`Fetcher`] trait is the seam the pipeline depends on; [`YtDlpFetcher`] is
//! the production implementation backed by the external `yt-dlp` binary.
//!
//! ## Usage
//!
//! ```no_run
//! use vidquiz::fetch::{Fetcher, YtDlpFetcher};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = YtDlpFetcher::from_path().expect("yt-dlp not found");
//!     fetcher
//!         .fetch(
//!             "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!             Path::new("/tmp/raw.mp3"),
//!             Duration::from_secs(120),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::YtDlpFetcher;
pub use traits::Fetcher;
