//! Download backend abstraction.
//!
//! Handlers talk to a `MediaDownloader` instead of spawning yt-dlp directly,
//! so the whole request flow can be driven by a mock in tests.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::core::error::AppError;
use crate::download::formats::MediaInfo;

/// Audio extraction target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    M4a,
}

impl AudioFormat {
    /// Codec name as yt-dlp's `--audio-format` expects it
    pub fn as_str(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "m4a" => Some(AudioFormat::M4a),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadKind {
    /// A specific video format; `merge_audio` requests `<id>+bestaudio`
    Video { format_id: String, merge_audio: bool },
    /// Best audio stream, converted to the given format
    Audio(AudioFormat),
}

impl DownloadKind {
    pub fn is_audio(&self) -> bool {
        matches!(self, DownloadKind::Audio(_))
    }
}

/// Request parameters for a download operation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub kind: DownloadKind,
    /// Directory the file is written to; owned by the caller
    pub output_dir: PathBuf,
}

/// Trait for download backends.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Human-readable backend name, for logs
    fn name(&self) -> &str;

    /// Fetch metadata and the format list without downloading.
    async fn extract_info(&self, url: &Url) -> Result<MediaInfo, AppError>;

    /// Download into `request.output_dir` and return the final file path.
    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_parse() {
        assert_eq!(AudioFormat::parse("mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::parse("M4A"), Some(AudioFormat::M4a));
        assert_eq!(AudioFormat::parse("flac"), None);
    }

    #[test]
    fn test_audio_format_display() {
        assert_eq!(AudioFormat::Mp3.to_string(), "mp3");
        assert_eq!(AudioFormat::M4a.as_str(), "m4a");
    }

    #[test]
    fn test_download_kind_is_audio() {
        assert!(DownloadKind::Audio(AudioFormat::Mp3).is_audio());
        assert!(!DownloadKind::Video {
            format_id: "22".into(),
            merge_audio: false
        }
        .is_audio());
    }
}
