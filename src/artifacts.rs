//! Per-run temporary artifact lifecycle
//!
//! Every run owns one [`ArtifactStore`] rooted at `<temp_dir>/<run_id>/`. Stages ask
//! the store for paths; the orchestrator calls [`ArtifactStore::release_all`] once at
//! the end of the run, whatever the outcome. Deletion problems are logged and never
//! returned, so they cannot mask the error that ended the run.

use crate::types::{ArtifactKind, RunId, TempArtifact};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owner of the temporary files produced during one run
#[derive(Debug)]
pub struct ArtifactStore {
    run_id: RunId,
    run_dir: PathBuf,
    artifacts: Vec<TempArtifact>,
    release_count: u32,
}

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Artifact files that existed and were deleted
    pub removed: usize,
    /// Artifact files that were already absent
    pub missing: usize,
    /// Deletions that failed for another reason (logged)
    pub failed: usize,
}

impl ArtifactStore {
    /// Create a store for `run_id` under `temp_dir`
    ///
    /// Nothing is created on disk until the first [`allocate`](Self::allocate).
    pub fn new(temp_dir: &Path, run_id: RunId) -> Self {
        Self {
            run_id,
            run_dir: temp_dir.join(run_id.to_string()),
            artifacts: Vec::new(),
            release_count: 0,
        }
    }

    /// The run this store belongs to
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The run-scoped working directory
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Artifacts allocated so far, in allocation order
    pub fn artifacts(&self) -> &[TempArtifact] {
        &self.artifacts
    }

    /// How many times [`release_all`](Self::release_all) has run
    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    /// Reserve a unique path for an artifact of `kind` with file `extension`
    ///
    /// Creates the run directory if needed. The returned path has no content yet.
    pub async fn allocate(
        &mut self,
        kind: ArtifactKind,
        extension: &str,
    ) -> std::io::Result<TempArtifact> {
        tokio::fs::create_dir_all(&self.run_dir).await?;

        let ordinal = self.artifacts.iter().filter(|a| a.kind == kind).count();
        let file_name = if ordinal == 0 {
            format!("{}.{}", kind.file_stem(), extension)
        } else {
            format!("{}-{}.{}", kind.file_stem(), ordinal, extension)
        };

        let artifact = TempArtifact {
            path: self.run_dir.join(file_name),
            kind,
            created_at: Utc::now(),
        };
        debug!(
            run_id = %self.run_id,
            path = ?artifact.path,
            ?kind,
            "allocated artifact"
        );
        self.artifacts.push(artifact.clone());
        Ok(artifact)
    }

    /// Delete every allocated artifact and the run directory
    ///
    /// Idempotent: later calls find nothing to delete. Files the tools left next
    /// to the artifacts (partial downloads, intermediate formats) go with the
    /// run directory.
    pub async fn release_all(&mut self) -> ReleaseSummary {
        use tokio::fs;

        self.release_count += 1;
        let mut summary = ReleaseSummary::default();

        for artifact in &self.artifacts {
            match fs::remove_file(&artifact.path).await {
                Ok(()) => {
                    debug!(run_id = %self.run_id, path = ?artifact.path, "deleted artifact");
                    summary.removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(run_id = %self.run_id, path = ?artifact.path, "artifact already gone");
                    summary.missing += 1;
                }
                Err(e) => {
                    warn!(
                        run_id = %self.run_id,
                        path = ?artifact.path,
                        error = %e,
                        "failed to delete artifact"
                    );
                    summary.failed += 1;
                }
            }
        }

        match fs::remove_dir_all(&self.run_dir).await {
            Ok(()) => debug!(run_id = %self.run_id, run_dir = ?self.run_dir, "removed run directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                run_id = %self.run_id,
                run_dir = ?self.run_dir,
                error = %e,
                "failed to remove run directory"
            ),
        }

        info!(
            run_id = %self.run_id,
            removed = summary.removed,
            missing = summary.missing,
            failed = summary.failed,
            "released run artifacts"
        );
        summary
    }
}

impl Drop for ArtifactStore {
    fn drop(&mut self) {
        // Reached without release_all only if the run future itself was dropped
        if self.release_count == 0 && !self.artifacts.is_empty() {
            if let Err(e) = std::fs::remove_dir_all(&self.run_dir)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(
                    run_id = %self.run_id,
                    run_dir = ?self.run_dir,
                    error = %e,
                    "failed to remove run directory on drop"
                );
            }
        }
    }
}
