//! Request flow independent of Telegram I/O.
//!
//! A link goes through three steps:
//! 1. `prepare`: validate the link, fetch formats, register a pending request.
//! 2. `start`: resolve a pressed button into a `DownloadJob` or a verdict
//!    such as expired or busy.
//! 3. `run` then `finish`: download into a private temp dir, enforce the
//!    upload limit, then schedule deletion of the files and the token.
//!
//! The Telegram handlers only translate these outcomes into API calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

use crate::core::config;
use crate::core::error::AppError;
use crate::core::validation::{detect_supported_url, Platform};
use crate::download::formats::{select_quality_options, video_formats, QualityOption};
use crate::download::source::{AudioFormat, DownloadKind, DownloadRequest, MediaDownloader};
use crate::storage::pending::{BeginError, PendingRequests, RequestToken};
use crate::telegram::callback::CallbackAction;

/// Limits and locations used by the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_file_size: u64,
    pub cleanup_delay: Duration,
    pub temp_root: PathBuf,
    pub request_ttl: Duration,
    pub sweep_interval: Duration,
}

impl PipelineSettings {
    pub fn from_config() -> Self {
        Self {
            max_file_size: config::download::MAX_FILE_SIZE_BYTES,
            cleanup_delay: config::download::cleanup_delay(),
            temp_root: config::TEMP_FILES_DIR.clone(),
            request_ttl: config::pending::ttl(),
            sweep_interval: config::pending::sweep_interval(),
        }
    }
}

/// Result of handling an incoming link
#[derive(Debug)]
pub enum PrepareOutcome {
    /// No link, or a link to a platform we don't serve
    Unsupported,
    /// Live streams can't be downloaded as a file
    LiveStream,
    /// yt-dlp found no video formats
    NoFormats,
    /// Ready for the user to choose
    Choices {
        token: RequestToken,
        platform: Platform,
        title: String,
        options: Vec<QualityOption>,
    },
}

/// Result of a pressed button
#[derive(Debug)]
pub enum StartOutcome {
    Expired,
    Cancelled,
    Busy,
    /// The button refers to a format that isn't part of the request
    UnknownFormat,
    Job(DownloadJob),
}

/// A download about to run
#[derive(Debug)]
pub struct DownloadJob {
    pub token: RequestToken,
    pub chat_id: i64,
    pub url: Url,
    pub title: String,
    pub kind: DownloadKind,
    /// e.g. "720p" for video jobs
    pub quality: Option<String>,
    /// Exact size from the format list, when yt-dlp knew it
    pub known_size: Option<u64>,
    pub temp_dir: PathBuf,
}

impl DownloadJob {
    pub fn audio_format(&self) -> Option<AudioFormat> {
        match self.kind {
            DownloadKind::Audio(format) => Some(format),
            DownloadKind::Video { .. } => None,
        }
    }

    /// Short description for progress texts, e.g. "720p" or "MP3 audio"
    pub fn describe(&self) -> String {
        match (&self.kind, &self.quality) {
            (DownloadKind::Audio(format), _) => format!("{} audio", format.as_str().to_uppercase()),
            (DownloadKind::Video { .. }, Some(quality)) => quality.clone(),
            (DownloadKind::Video { format_id, .. }, None) => format_id.clone(),
        }
    }
}

/// A finished file ready to upload
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Result of running a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Over the upload limit; nothing will be sent
    TooLarge { size: u64 },
    File(DeliveredFile),
}

pub struct Pipeline {
    downloader: Arc<dyn MediaDownloader>,
    pending: Arc<PendingRequests>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(downloader: Arc<dyn MediaDownloader>, pending: Arc<PendingRequests>, settings: PipelineSettings) -> Self {
        Self {
            downloader,
            pending,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }

    pub fn downloader_name(&self) -> &str {
        self.downloader.name()
    }

    /// Validates the link in `text`, fetches formats and registers the request.
    pub async fn prepare(&self, text: &str, chat_id: i64) -> Result<PrepareOutcome, AppError> {
        let Some((url, platform)) = detect_supported_url(text) else {
            return Ok(PrepareOutcome::Unsupported);
        };

        let info = self.downloader.extract_info(&url).await?;

        if info.is_live() {
            log::info!("Rejecting live stream {} for chat {}", url, chat_id);
            return Ok(PrepareOutcome::LiveStream);
        }
        if video_formats(&info).is_empty() {
            log::info!("No video formats for {} (chat {})", url, chat_id);
            return Ok(PrepareOutcome::NoFormats);
        }

        let options = select_quality_options(&info);
        let title = info.display_title().to_string();
        let token = self
            .pending
            .insert(url.clone(), chat_id, title.clone(), options.clone())
            .await;

        log::info!(
            "Registered {} request {} for chat {}: {} quality options",
            platform,
            token,
            chat_id,
            options.len()
        );

        Ok(PrepareOutcome::Choices {
            token,
            platform,
            title,
            options,
        })
    }

    /// Resolves a pressed button.
    ///
    /// For download buttons the request is marked in flight and a private
    /// temp directory is created; the caller must hand the job back to
    /// [`Pipeline::finish`] whatever happens next.
    pub async fn start(&self, action: &CallbackAction) -> Result<StartOutcome, AppError> {
        let (token, request, kind, quality, known_size) = match action {
            CallbackAction::Cancel { token } => {
                if self.pending.remove_if_idle(token).await {
                    log::info!("Request {} cancelled", token);
                    return Ok(StartOutcome::Cancelled);
                }
                return Ok(if self.pending.get(token).await.is_some() {
                    StartOutcome::Busy
                } else {
                    StartOutcome::Expired
                });
            }
            CallbackAction::Video { token, format_id } => {
                let request = match self.pending.begin(token).await {
                    Ok(request) => request,
                    Err(e) => return Ok(begin_error_outcome(e)),
                };
                let Some(option) = request.option(format_id).cloned() else {
                    self.pending.finish(token).await;
                    log::warn!("Format {} is not part of request {}", format_id, token);
                    return Ok(StartOutcome::UnknownFormat);
                };
                let kind = DownloadKind::Video {
                    format_id: option.format_id.clone(),
                    merge_audio: !option.has_audio,
                };
                let known_size = option.size_bytes.filter(|_| option.size_is_exact);
                (token, request, kind, Some(option.quality()), known_size)
            }
            CallbackAction::Audio { token, format } => {
                let request = match self.pending.begin(token).await {
                    Ok(request) => request,
                    Err(e) => return Ok(begin_error_outcome(e)),
                };
                (token, request, DownloadKind::Audio(*format), None, None)
            }
        };

        let temp_dir = self
            .settings
            .temp_root
            .join(format!("tgdl_{}", uuid::Uuid::new_v4().simple()));
        if let Err(e) = tokio::fs::create_dir_all(&temp_dir).await {
            self.pending.finish(token).await;
            return Err(e.into());
        }

        Ok(StartOutcome::Job(DownloadJob {
            token: token.clone(),
            chat_id: request.chat_id,
            url: request.url,
            title: request.title,
            kind,
            quality,
            known_size,
            temp_dir,
        }))
    }

    /// Downloads the job's file and checks it against the upload limit.
    pub async fn run(&self, job: &DownloadJob) -> Result<JobOutcome, AppError> {
        if let Some(size) = job.known_size.filter(|size| *size > self.settings.max_file_size) {
            log::info!(
                "Skipping download of {} ({}): known size {} exceeds limit",
                job.url,
                job.describe(),
                size
            );
            return Ok(JobOutcome::TooLarge { size });
        }

        let request = DownloadRequest {
            url: job.url.clone(),
            kind: job.kind.clone(),
            output_dir: job.temp_dir.clone(),
        };
        let path = self.downloader.download(&request).await?;
        let size = tokio::fs::metadata(&path).await?.len();

        if size > self.settings.max_file_size {
            log::info!("{} is {} bytes, over the upload limit", path.display(), size);
            return Ok(JobOutcome::TooLarge { size });
        }

        Ok(JobOutcome::File(DeliveredFile { path, size }))
    }

    /// Releases the request and schedules deletion of the job's files.
    pub async fn finish(&self, job: DownloadJob) -> JoinHandle<()> {
        self.pending.finish(&job.token).await;
        schedule_cleanup(
            Arc::clone(&self.pending),
            job.temp_dir,
            job.token,
            self.settings.cleanup_delay,
        )
    }

    /// Periodically forgets keyboards nobody pressed
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let pending = Arc::clone(&self.pending);
        let ttl = self.settings.request_ttl;
        let every = self.settings.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = pending.purge_expired(ttl).await;
                if removed > 0 {
                    log::info!("Forgot {} abandoned requests", removed);
                }
            }
        })
    }
}

fn begin_error_outcome(err: BeginError) -> StartOutcome {
    match err {
        BeginError::Expired => StartOutcome::Expired,
        BeginError::Busy => StartOutcome::Busy,
    }
}

/// Deletes `dir` and forgets `token` (unless another download for it is
/// running) after `delay`.
pub fn schedule_cleanup(
    pending: Arc<PendingRequests>,
    dir: PathBuf,
    token: RequestToken,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        remove_dir_logged(&dir).await;
        pending.remove_if_idle(&token).await;
    })
}

async fn remove_dir_logged(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => log::info!("Cleaned up {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Cleanup failed for {}: {}", dir.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(kind: DownloadKind, quality: Option<&str>) -> DownloadJob {
        DownloadJob {
            token: RequestToken::from("t"),
            chat_id: 1,
            url: Url::parse("https://youtu.be/abc").unwrap(),
            title: "Clip".into(),
            kind,
            quality: quality.map(str::to_string),
            known_size: None,
            temp_dir: PathBuf::from("/tmp/none"),
        }
    }

    #[test]
    fn test_job_describe() {
        assert_eq!(job(DownloadKind::Audio(AudioFormat::Mp3), None).describe(), "MP3 audio");
        let video = DownloadKind::Video {
            format_id: "22".into(),
            merge_audio: false,
        };
        assert_eq!(job(video.clone(), Some("720p")).describe(), "720p");
        assert_eq!(job(video, None).describe(), "22");
    }

    #[test]
    fn test_job_audio_format() {
        assert_eq!(
            job(DownloadKind::Audio(AudioFormat::M4a), None).audio_format(),
            Some(AudioFormat::M4a)
        );
    }

    #[tokio::test]
    async fn test_schedule_cleanup_removes_dir_and_token() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tgdl_job");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("clip.mp4"), b"data").unwrap();

        let pending = Arc::new(PendingRequests::new());
        let token = pending
            .insert(Url::parse("https://youtu.be/abc").unwrap(), 1, "Clip".into(), vec![])
            .await;

        schedule_cleanup(Arc::clone(&pending), dir.clone(), token.clone(), Duration::ZERO)
            .await
            .unwrap();

        assert!(!dir.exists());
        assert!(pending.get(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_schedule_cleanup_missing_dir_is_fine() {
        let pending = Arc::new(PendingRequests::new());
        schedule_cleanup(
            pending,
            PathBuf::from("/nonexistent/tgdl_gone"),
            RequestToken::from("x"),
            Duration::ZERO,
        )
        .await
        .unwrap();
    }
}
