//! Mock implementations for tests
//!
//! Lets the request pipeline run without spawning yt-dlp or touching the
//! network.

pub mod mock_downloader;

#[allow(unused_imports)]
pub use mock_downloader::{MockDownloader, MockDownloaderConfig};
