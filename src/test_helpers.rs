//! Shared test helpers: fake external tools and scratch configs.

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Fake yt-dlp: writes a few bytes to the path following `-o`
pub(crate) const FAKE_YT_DLP: &str = r#"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
printf 'ID3fake-raw-audio' > "$out"
"#;

/// Fake ffmpeg: writes a few bytes to its last argument
pub(crate) const FAKE_FFMPEG: &str = r#"
for last in "$@"; do :; done
printf 'ID3fake-converted-audio' > "$last"
"#;

/// Fake ffmpeg that "succeeds" but leaves a zero-byte output
pub(crate) const EMPTY_FFMPEG: &str = r#"
for last in "$@"; do :; done
: > "$last"
"#;

/// Records its pid next to itself, then stalls; writes `-o` only if never killed
pub(crate) const STALLED_TOOL: &str = r#"
echo $$ > "$(dirname "$0")/tool.pid"
sleep 30
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then echo late > "$2"; fi
  shift
done
"#;

/// Write an executable `/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Whether a process with `pid` still exists
#[cfg(unix)]
pub(crate) fn process_alive(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 performs only an existence/permission check
    unsafe { libc::kill(pid, 0) == 0 }
}

/// A config whose workspace lives in `temp_dir` and whose services have keys
pub(crate) fn test_config(temp_dir: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.temp_dir = temp_dir.join("work");
    config.transcription.api_key = Some("sk-test".into());
    config.generation.api_key = Some("sk-test".into());
    config.tools.search_path = false;
    config
}
