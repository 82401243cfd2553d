//! Process execution utilities with timeout support
//!
//! Provides helpers for running yt-dlp with configurable timeouts so a hung
//! extractor can't block a handler forever.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::AppError;
use crate::download::error::DownloadError;

/// Run an async Command with a timeout.
///
/// The child is killed when the timeout fires. Returns the process Output on
/// success, or an AppError on timeout/IO failure.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, AppError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AppError::Io(e)),
        Err(_) => Err(DownloadError::Timeout(format!("Process timed out after {}s", timeout.as_secs())).into()),
    }
}
