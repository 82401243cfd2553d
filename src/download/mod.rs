//! Download management and processing

pub mod error;
pub mod formats;
pub mod pipeline;
pub mod source;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::DownloadError;
pub use formats::{MediaInfo, QualityOption};
pub use pipeline::{Pipeline, PipelineSettings};
pub use source::{AudioFormat, DownloadKind, DownloadRequest, MediaDownloader};
pub use ytdlp::YtDlp;
