//! Process execution utilities with timeout support
//!
//! Provides helpers for running external processes (yt-dlp, the JS runtime)
//! with configurable timeouts so a hung process cannot pin a request forever.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::download::error::DownloadError;

/// Run an async Command with a timeout.
///
/// stdout and stderr are captured. The child is killed when the timeout
/// fires (the output future is dropped and `kill_on_drop` reaps it).
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, DownloadError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(DownloadError::Spawn(e.to_string())),
        Err(_) => Err(DownloadError::Timeout(timeout)),
    }
}

/// Runs `<bin> --version` and returns the first line of stdout.
///
/// Returns `None` when the binary is missing, exits non-zero or does not
/// answer within `timeout`.
pub async fn probe_version(bin: &str, timeout: Duration) -> Option<String> {
    let output = match run_with_timeout(Command::new(bin).arg("--version"), timeout).await {
        Ok(output) => output,
        Err(e) => {
            log::debug!("Version probe for {} failed: {}", bin, e);
            return None;
        }
    };

    if !output.status.success() {
        log::debug!("Version probe for {} exited with {:?}", bin, output.status.code());
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
