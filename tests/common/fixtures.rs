//! Canned yt-dlp metadata and pipeline settings

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tgdl::download::formats::MediaInfo;
use tgdl::download::PipelineSettings;

pub const TEST_CHAT_ID: i64 = 123_456_789;

/// A typical YouTube-like format list: progressive 360p and 720p, DASH video
/// up to 1080p and an audio-only track.
pub fn fixture_json() -> serde_json::Value {
    json!({
        "id": "abc",
        "title": "Test Clip",
        "duration": 42.0,
        "is_live": false,
        "formats": [
            { "format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 1_000_000 },
            { "format_id": "18", "ext": "mp4", "height": 360, "width": 640, "tbr": 500.0,
              "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "filesize": 3_000_000 },
            { "format_id": "22", "ext": "mp4", "height": 720, "width": 1280, "tbr": 1500.0,
              "vcodec": "avc1.64001F", "acodec": "mp4a.40.2", "filesize": 9_000_000 },
            { "format_id": "137", "ext": "mp4", "height": 1080, "width": 1920, "tbr": 4000.0,
              "vcodec": "avc1.640028", "acodec": "none", "filesize": 80_000_000 },
            { "format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none", "format_note": "storyboard" }
        ]
    })
}

pub fn fixture_info() -> MediaInfo {
    MediaInfo::from_value(fixture_json()).expect("fixture parses")
}

/// Only a DASH video stream plus audio, sizes unknown
pub fn video_only_info() -> MediaInfo {
    MediaInfo::from_value(json!({
        "title": "Silent",
        "formats": [
            { "format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "filesize_approx": 500_000 },
            { "format_id": "136", "ext": "mp4", "height": 720, "tbr": 1200.0, "vcodec": "avc1", "acodec": "none" }
        ]
    }))
    .expect("fixture parses")
}

pub fn live_info() -> MediaInfo {
    let mut value = fixture_json();
    value["is_live"] = json!(true);
    value["live_status"] = json!("is_live");
    MediaInfo::from_value(value).expect("fixture parses")
}

/// Settings with a tiny limit and no cleanup delay, rooted in `temp_root`
pub fn test_settings(temp_root: &Path, max_file_size: u64) -> PipelineSettings {
    PipelineSettings {
        max_file_size,
        cleanup_delay: Duration::ZERO,
        temp_root: temp_root.to_path_buf(),
        request_ttl: Duration::from_secs(3600),
        sweep_interval: Duration::from_millis(10),
    }
}
