//! Trait for audio conversion implementations

use crate::error::ConvertError;
use async_trait::async_trait;
use std::path::Path;

/// Re-encodes an audio file
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert `input` into `output`, overwriting any existing file
    ///
    /// `input` is never modified. Succeeds only when `output` exists and is non-empty.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Whether the implementation can run at all
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
