//! Trait for audio download implementations

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Pulls audio from a source URL into a local file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the audio of `source_url` into `destination`
    ///
    /// The download is bounded by `timeout`. When the timeout elapses first the
    /// underlying invocation is terminated before this returns
    /// [`FetchError::Timeout`], so nothing writes to `destination` afterwards.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] if the download did not finish in time
    /// - [`FetchError::InvocationFailed`] if the tool could not run or exited non-zero
    /// - [`FetchError::OutputMissing`] if `destination` is missing or empty afterwards,
    ///   even when the tool reported success
    async fn fetch(
        &self,
        source_url: &str,
        destination: &Path,
        timeout: Duration,
    ) -> Result<(), FetchError>;

    /// Whether the implementation can run at all (binary present, etc.)
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
