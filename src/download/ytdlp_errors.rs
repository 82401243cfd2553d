/// yt-dlp error analysis
///
/// Maps yt-dlp stderr to a small set of categories and a user-facing message.

/// yt-dlp error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// yt-dlp has no extractor for the link
    UnsupportedUrl,
    /// Private, removed or geo-blocked
    VideoUnavailable,
    /// The platform wants a logged-in session (age gate, private account)
    LoginRequired,
    /// Timeouts, connection resets, DNS
    NetworkError,
    /// Anything else
    Unknown,
}

/// Analyzes yt-dlp stderr and determines the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("unsupported url") || stderr_lower.contains("no suitable extractor") {
        return YtDlpErrorType::UnsupportedUrl;
    }

    if stderr_lower.contains("sign in to confirm")
        || stderr_lower.contains("login required")
        || stderr_lower.contains("requires authentication")
        || stderr_lower.contains("use --cookies")
        || stderr_lower.contains("age-restricted")
    {
        return YtDlpErrorType::LoginRequired;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video is private")
        || stderr_lower.contains("has been removed")
        || stderr_lower.contains("does not exist")
        || stderr_lower.contains("not available in your country")
        || stderr_lower.contains("http error 404")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("temporary failure in name resolution")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Returns the message shown to the user for a failed download
pub fn user_message(error_type: &YtDlpErrorType) -> &'static str {
    match error_type {
        YtDlpErrorType::UnsupportedUrl => "This link isn't supported. Try another link.",
        YtDlpErrorType::VideoUnavailable => {
            "The video is unavailable. It may be private, removed or blocked in this region."
        }
        YtDlpErrorType::LoginRequired => "This video requires a login and can't be downloaded.",
        YtDlpErrorType::NetworkError => "Network problem while downloading. Please try again in a minute.",
        YtDlpErrorType::Unknown => "Failed to download. Please try again later.",
    }
}

/// Pulls the last `ERROR:` line out of yt-dlp stderr for compact logs
pub fn last_error_line(stderr: &str) -> Option<&str> {
    stderr.lines().rev().map(str::trim).find(|line| line.starts_with("ERROR:"))
}
