//! Mock downloader
//!
//! Serves canned metadata and writes sparse files of a configured size
//! instead of running yt-dlp. Every call is recorded for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use tgdl::core::error::AppError;
use tgdl::download::error::DownloadError;
use tgdl::download::formats::MediaInfo;
use tgdl::download::source::{DownloadKind, DownloadRequest, MediaDownloader};
use tgdl::download::ytdlp_errors::YtDlpErrorType;

/// Configuration for the mock downloader
#[derive(Debug, Clone)]
pub struct MockDownloaderConfig {
    /// Metadata returned by `extract_info`
    pub info: MediaInfo,
    /// Size of the file `download` produces
    pub file_size: u64,
    /// Make `extract_info` fail with this classification
    pub info_error: Option<YtDlpErrorType>,
    /// Make `download` fail with this classification
    pub download_error: Option<YtDlpErrorType>,
    /// Simulated download time
    pub delay: Duration,
    /// Produce a directory instead of a file, so uploading it fails
    pub unreadable_output: bool,
}

impl MockDownloaderConfig {
    pub fn new(info: MediaInfo) -> Self {
        Self {
            info,
            file_size: 1_000,
            info_error: None,
            download_error: None,
            delay: Duration::ZERO,
            unreadable_output: false,
        }
    }

    pub fn file_size(mut self, size: u64) -> Self {
        self.file_size = size;
        self
    }

    pub fn info_error(mut self, kind: YtDlpErrorType) -> Self {
        self.info_error = Some(kind);
        self
    }

    pub fn download_error(mut self, kind: YtDlpErrorType) -> Self {
        self.download_error = Some(kind);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn unreadable_output(mut self) -> Self {
        self.unreadable_output = true;
        self
    }
}

pub struct MockDownloader {
    config: MockDownloaderConfig,
    info_calls: AtomicUsize,
    downloads: Mutex<Vec<DownloadRequest>>,
}

impl MockDownloader {
    pub fn new(config: MockDownloaderConfig) -> Self {
        Self {
            config,
            info_calls: AtomicUsize::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub async fn downloads(&self) -> Vec<DownloadRequest> {
        self.downloads.lock().await.clone()
    }

    fn error(kind: &YtDlpErrorType) -> AppError {
        DownloadError::YtDlp {
            kind: kind.clone(),
            message: "ERROR: simulated failure".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl MediaDownloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_info(&self, _url: &Url) -> Result<MediaInfo, AppError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = &self.config.info_error {
            return Err(Self::error(kind));
        }
        Ok(self.config.info.clone())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, AppError> {
        self.downloads.lock().await.push(request.clone());
        tokio::time::sleep(self.config.delay).await;

        if let Some(kind) = &self.config.download_error {
            return Err(Self::error(kind));
        }

        let ext = match &request.kind {
            DownloadKind::Video { .. } => "mp4".to_string(),
            DownloadKind::Audio(format) => format.as_str().to_string(),
        };
        let path = request.output_dir.join(format!("{}.{}", self.config.info.display_title(), ext));
        if self.config.unreadable_output {
            std::fs::create_dir_all(&path)?;
            return Ok(path);
        }
        let file = std::fs::File::create(&path)?;
        file.set_len(self.config.file_size)?;
        Ok(path)
    }
}
