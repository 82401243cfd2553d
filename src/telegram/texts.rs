//! User-facing texts

use std::time::Duration;

use crate::core::error::AppError;
use crate::core::utils::{format_megabytes, truncate_chars};
use crate::core::validation::supported_platforms_list;
use crate::download::pipeline::DownloadJob;
use crate::download::ytdlp_errors::user_message;

pub const FETCHING_FORMATS: &str = "Fetching formats... Please wait.";
pub const NO_VIDEO_FORMATS: &str = "No video formats found.";
pub const LIVE_STREAM: &str = "Live streams can't be downloaded. Try again once the broadcast has ended.";
pub const CHOOSE_QUALITY: &str = "Choose a quality or audio:";
pub const FETCH_FAILED: &str = "Failed to fetch video info. Try another link.";
pub const REQUEST_EXPIRED: &str = "Request expired.";
pub const CANCELLED: &str = "Cancelled.";
pub const BUSY: &str = "This download is already in progress.";
pub const UNKNOWN_FORMAT: &str = "This quality is no longer available.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Incident logged.";

/// Whole megabytes, as shown in limits ("50 MB")
fn whole_megabytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

fn minutes_phrase(delay: Duration) -> String {
    match delay.as_secs() {
        s if s < 60 => format!("{} seconds", s),
        60..=119 => "1 minute".to_string(),
        s => format!("{} minutes", s / 60),
    }
}

pub fn start_text(max_file_size: u64) -> String {
    format!(
        "Hi! Send me a YouTube/TikTok/Instagram/X/Reddit video link. I can download video ≤{}MB or extract audio.",
        whole_megabytes(max_file_size)
    )
}

pub fn help_text(max_file_size: u64, cleanup_delay: Duration) -> String {
    format!(
        "Usage:\n1. Send a video URL.\n2. Choose video quality or audio download.\n3. The bot will send the file if ≤{} MB.\n4. Files are deleted from server after {}.",
        whole_megabytes(max_file_size),
        minutes_phrase(cleanup_delay)
    )
}

pub fn unsupported_text() -> String {
    format!("Unsupported URL. Supported: {}.", supported_platforms_list())
}

/// Longest title shown above the keyboard
const MAX_TITLE_CHARS: usize = 200;

/// Message above the quality keyboard
pub fn choices_text(title: &str) -> String {
    format!("{}\n\n{}", truncate_chars(title, MAX_TITLE_CHARS), CHOOSE_QUALITY)
}

pub fn downloading_text(job: &DownloadJob) -> String {
    format!("Downloading {}...", job.describe())
}

pub fn too_large_text(job: &DownloadJob, size: u64, max_file_size: u64) -> String {
    let what = if job.kind.is_audio() { "Audio size" } else { "File size" };
    format!(
        "{} {} MB exceeds {} MB limit.",
        what,
        format_megabytes(size),
        whole_megabytes(max_file_size)
    )
}

pub fn caption(job: &DownloadJob, size: u64) -> String {
    match job.audio_format() {
        Some(format) => format!(
            "Audio ({}) size: {} MB",
            format.as_str().to_uppercase(),
            format_megabytes(size)
        ),
        None => format!("Video size: {} MB", format_megabytes(size)),
    }
}

/// Text shown when a download fails
pub fn download_failed_text(err: &AppError) -> String {
    match err.as_download() {
        Some(download_err) => user_message(&download_err.ytdlp_kind()).to_string(),
        None => UNEXPECTED_ERROR.to_string(),
    }
}
