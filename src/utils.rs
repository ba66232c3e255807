//! Utility functions for running external tools and inspecting their output files

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Maximum number of stderr bytes carried into error messages
const STDERR_TAIL_BYTES: usize = 512;

/// Captured result of a finished external tool
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Exit code plus the tail of stderr, for error reporting
    pub fn exit_info(&self) -> String {
        let code = match self.status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let tail = stderr_tail(&self.stderr);
        if tail.is_empty() {
            code
        } else {
            format!("{}: {}", code, tail)
        }
    }
}

/// Why an external tool did not produce a [`ToolOutput`]
#[derive(Debug)]
pub(crate) enum ToolError {
    /// The binary could not be started
    Spawn(std::io::Error),
    /// Waiting for the process failed
    Wait(std::io::Error),
    /// The time limit elapsed; the process (group) was killed
    TimedOut,
}

/// Run an external tool to completion, capturing stdout and stderr.
///
/// The child is spawned with `kill_on_drop`, and on Unix in its own process group,
/// so dropping the returned future (caller cancellation) or hitting `limit` kills the
/// tool together with any helpers it started. Nothing keeps writing after this
/// function has returned.
pub(crate) async fn run_tool(
    command: &mut Command,
    limit: Option<Duration>,
) -> Result<ToolOutput, ToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(ToolError::Spawn)?;
    let mut group = ProcessGroupGuard::new(child.id());

    let outcome = match limit {
        Some(limit) => tokio::time::timeout(limit, collect_output(&mut child))
            .await
            .ok(),
        None => Some(collect_output(&mut child).await),
    };

    match outcome {
        Some(result) => {
            group.disarm();
            result.map_err(ToolError::Wait)
        }
        None => {
            group.kill();
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "tool already exited while being killed");
            }
            Err(ToolError::TimedOut)
        }
    }
}

async fn collect_output(child: &mut Child) -> std::io::Result<ToolOutput> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (status, stdout, stderr) = tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr));
    Ok(ToolOutput {
        status: status?,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe
        && let Err(e) = pipe.read_to_end(&mut buf).await
    {
        tracing::debug!(error = %e, "failed to read tool output");
    }
    buf
}

/// Kills the tool's whole process group unless disarmed.
///
/// Covers both explicit timeouts and the future being dropped mid-run.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers. The negative pid addresses only the
    // process group created for this child via process_group(0).
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {
    // Only the direct child is killed (kill_on_drop) on this platform
}

/// Last few hundred bytes of stderr, trimmed, lossily decoded
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

/// Size of the file at `path`, or None if it does not exist or is not a file
pub(crate) async fn file_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        _ => None,
    }
}

/// Resolve a tool binary: explicit path first, then PATH lookup if allowed
pub(crate) fn resolve_binary(
    explicit: Option<&Path>,
    name: &str,
    search_path: bool,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if search_path {
        return which::which(name).ok();
    }
    None
}
