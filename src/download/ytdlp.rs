//! yt-dlp backed downloader
//!
//! Every call spawns the yt-dlp executable (`YTDL_BIN`) with a timeout:
//! `-J` for metadata, and a download run that prints the final file path
//! after all postprocessors (merge, audio extraction) have moved it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::run_with_timeout;
use crate::download::error::DownloadError;
use crate::download::formats::MediaInfo;
use crate::download::source::{DownloadKind, DownloadRequest, MediaDownloader};
use crate::download::ytdlp_errors::{analyze_ytdlp_error, last_error_line};

/// File name template; long titles are cut to 200 characters
pub const OUTPUT_TEMPLATE: &str = "%(title).200s.%(ext)s";

/// Bitrate used for audio extraction
pub const AUDIO_QUALITY: &str = "192K";

/// Downloader that shells out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlp {
    bin: String,
    info_timeout: Duration,
    download_timeout: Duration,
}

impl YtDlp {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            info_timeout: config::download::ytdlp_timeout(),
            download_timeout: config::download::download_timeout(),
        }
    }

    /// Downloader using `YTDL_BIN` and the configured timeouts
    pub fn from_config() -> Self {
        Self::new(config::YTDL_BIN.as_str())
    }

    pub fn with_timeouts(mut self, info_timeout: Duration, download_timeout: Duration) -> Self {
        self.info_timeout = info_timeout;
        self.download_timeout = download_timeout;
        self
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Returns `yt-dlp --version` output
    pub async fn version(&self) -> Result<String, AppError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--version");
        let output = run_with_timeout(&mut cmd, Duration::from_secs(15))
            .await
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(failure(&output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn run(&self, args: &[String], timeout: Duration) -> Result<Output, AppError> {
        log::debug!("Running {} {}", self.bin, args.join(" "));
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        let output = run_with_timeout(&mut cmd, timeout)
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let err = failure(&output);
            log::warn!(
                "yt-dlp failed (exit code {:?}, {:?}): {}",
                output.status.code(),
                err.ytdlp_kind(),
                err.message()
            );
            return Err(err.into());
        }
        Ok(output)
    }

    fn spawn_error(&self, err: AppError) -> AppError {
        match err {
            AppError::Io(e) => DownloadError::Process(format!("Failed to run {}: {}", self.bin, e)).into(),
            other => other,
        }
    }
}

/// Arguments for a metadata-only run
pub fn build_info_args(url: &Url) -> Vec<String> {
    vec![
        "-J".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--".to_string(),
        url.to_string(),
    ]
}

/// yt-dlp format selector for a video request
pub fn video_format_selector(format_id: &str, merge_audio: bool) -> String {
    if merge_audio {
        format!("{id}+bestaudio/{id}", id = format_id)
    } else {
        format_id.to_string()
    }
}

/// Arguments for a download run
pub fn build_download_args(request: &DownloadRequest) -> Vec<String> {
    let output = request.output_dir.join(OUTPUT_TEMPLATE);
    let mut args: Vec<String> = vec![
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--no-simulate".to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
        "-o".to_string(),
        output.to_string_lossy().into_owned(),
    ];

    match &request.kind {
        DownloadKind::Video { format_id, merge_audio } => {
            args.extend([
                "-f".to_string(),
                video_format_selector(format_id, *merge_audio),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
            ]);
        }
        DownloadKind::Audio(format) => {
            args.extend([
                "-f".to_string(),
                "bestaudio/best".to_string(),
                "-x".to_string(),
                "--audio-format".to_string(),
                format.as_str().to_string(),
                "--audio-quality".to_string(),
                AUDIO_QUALITY.to_string(),
            ]);
        }
    }

    args.push("--".to_string());
    args.push(request.url.to_string());
    args
}

/// Finds the file yt-dlp produced.
///
/// Prefers the last printed path that exists; otherwise the only finished
/// file in the output directory (partial `.part`/`.ytdl` leftovers are
/// ignored). Several candidates without a printed path are ambiguous.
pub fn resolve_downloaded_file(stdout: &str, output_dir: &Path) -> Result<PathBuf, DownloadError> {
    let printed = stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .find(|path| path.is_file());
    if let Some(path) = printed {
        return Ok(path);
    }

    let entries = std::fs::read_dir(output_dir)
        .map_err(|e| DownloadError::FileNotFound(format!("Cannot read {}: {}", output_dir.display(), e)))?;

    let mut finished: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !name.ends_with(".part") && !name.ends_with(".ytdl")
        })
        .filter(|entry| entry.metadata().is_ok_and(|meta| meta.is_file()))
        .map(|entry| entry.path())
        .collect();

    match finished.len() {
        0 => Err(DownloadError::FileNotFound("Downloaded file not found".to_string())),
        1 => Ok(finished.remove(0)),
        n => Err(DownloadError::FileNotFound(format!(
            "{} candidate files in {} and no path reported",
            n,
            output_dir.display()
        ))),
    }
}

/// Builds a classified error from a failed yt-dlp run
fn failure(output: &Output) -> DownloadError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = last_error_line(&stderr)
        .map(str::to_string)
        .unwrap_or_else(|| format!("yt-dlp exited with status {:?}", output.status.code()));
    DownloadError::YtDlp {
        kind: analyze_ytdlp_error(&stderr),
        message,
    }
}

#[async_trait]
impl MediaDownloader for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &Url) -> Result<MediaInfo, AppError> {
        log::info!("Fetching formats for {}", url);
        let output = self.run(&build_info_args(url), self.info_timeout).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = MediaInfo::from_json_str(&stdout)?;
        log::debug!("{} formats for {} ({:?})", info.formats.len(), url, info.title);
        Ok(info)
    }

    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf, AppError> {
        log::info!(
            "Downloading {} as {:?} into {}",
            request.url,
            request.kind,
            request.output_dir.display()
        );
        let output = self.run(&build_download_args(request), self.download_timeout).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = resolve_downloaded_file(&stdout, &request.output_dir)?;
        log::info!("Downloaded {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::source::AudioFormat;
    use pretty_assertions::assert_eq;

    fn request(kind: DownloadKind) -> DownloadRequest {
        DownloadRequest {
            url: Url::parse("https://youtu.be/abc").unwrap(),
            kind,
            output_dir: PathBuf::from("/tmp/tgdl_test"),
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_info_args() {
        let url = Url::parse("https://youtu.be/abc").unwrap();
        assert_eq!(
            build_info_args(&url),
            vec!["-J", "--no-playlist", "--no-warnings", "--", "https://youtu.be/abc"]
        );
    }

    #[test]
    fn test_video_selector() {
        assert_eq!(video_format_selector("137", true), "137+bestaudio/137");
        assert_eq!(video_format_selector("22", false), "22");
    }

    #[test]
    fn test_download_args_video() {
        let args = build_download_args(&request(DownloadKind::Video {
            format_id: "137".into(),
            merge_audio: true,
        }));
        assert_eq!(value_after(&args, "-f"), Some("137+bestaudio/137"));
        assert_eq!(value_after(&args, "--merge-output-format"), Some("mp4"));
        assert_eq!(value_after(&args, "--print"), Some("after_move:filepath"));
        assert_eq!(value_after(&args, "-o"), Some("/tmp/tgdl_test/%(title).200s.%(ext)s"));
        assert!(!args.contains(&"-x".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_download_args_audio() {
        let args = build_download_args(&request(DownloadKind::Audio(AudioFormat::M4a)));
        assert_eq!(value_after(&args, "-f"), Some("bestaudio/best"));
        assert_eq!(value_after(&args, "--audio-format"), Some("m4a"));
        assert_eq!(value_after(&args, "--audio-quality"), Some("192K"));
        assert!(args.contains(&"-x".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn test_resolve_prefers_printed_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, b"aaaa").unwrap();
        std::fs::write(&b, b"b").unwrap();
        let stdout = format!("{}\n\n", b.display());
        assert_eq!(resolve_downloaded_file(&stdout, dir.path()).unwrap(), b);
    }

    #[test]
    fn test_resolve_falls_back_to_single_finished_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.f137.mp4.part"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("clip.mp4"), vec![0u8; 10]).unwrap();
        let path = resolve_downloaded_file("/nonexistent/file.mp4\n", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("clip.mp4"));
    }

    #[test]
    fn test_resolve_several_files_without_printed_path_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join("clip.webp"), vec![0u8; 100]).unwrap();
        let err = resolve_downloaded_file("", dir.path()).unwrap_err();
        assert!(matches!(err, DownloadError::FileNotFound(_)));
    }

    #[test]
    fn test_resolve_empty_dir_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_downloaded_file("", dir.path()).unwrap_err();
        assert!(matches!(err, DownloadError::FileNotFound(_)));
    }
}
