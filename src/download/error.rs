use std::fmt;

use crate::download::ytdlp_errors::YtDlpErrorType;

/// Structured error type for download operations.
///
/// Categorized variants so handlers can pick a user message and logs can
/// carry a stable subcategory.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp exited with a failure; `kind` is the classified stderr
    YtDlp { kind: YtDlpErrorType, message: String },
    /// Expected file not found after the download finished
    FileNotFound(String),
    /// Download or metadata request timed out
    Timeout(String),
    /// Process execution failure (spawn, signal)
    Process(String),
    /// yt-dlp output could not be understood
    Parse(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp { .. } => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
            DownloadError::Parse(_) => "parse",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::YtDlp { message, .. }
            | DownloadError::FileNotFound(message)
            | DownloadError::Timeout(message)
            | DownloadError::Process(message)
            | DownloadError::Parse(message) => message,
        }
    }

    /// yt-dlp error classification, `Unknown` for non-yt-dlp failures
    pub fn ytdlp_kind(&self) -> YtDlpErrorType {
        match self {
            DownloadError::YtDlp { kind, .. } => kind.clone(),
            DownloadError::Timeout(_) => YtDlpErrorType::NetworkError,
            _ => YtDlpErrorType::Unknown,
        }
    }
}
