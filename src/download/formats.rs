//! yt-dlp metadata model and quality selection
//!
//! `MediaInfo` is the subset of `yt-dlp -J` output the bot needs. Quality
//! selection turns the (often long) format list into at most one button per
//! rung of a fixed resolution ladder.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::utils::format_megabytes;
use crate::download::error::DownloadError;

/// Resolution ladder offered to users, highest first
pub const QUALITY_LADDER: [u32; 5] = [1080, 720, 480, 360, 240];

/// Containers that Telegram can play (after an mp4 merge for mkv/webm)
const VIDEO_CONTAINERS: [&str; 3] = ["mp4", "mkv", "webm"];

/// Accepts integers, floats and nulls; yt-dlp extractors are not consistent
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
    }))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.and_then(|v| u32::try_from(v).ok()))
}

/// A single entry of the yt-dlp `formats` array
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FormatEntry {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    /// Total bitrate in kbit/s
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize_approx: Option<u64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

impl FormatEntry {
    /// A missing vcodec counts as video, only an explicit "none" excludes it
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video() && self.acodec.as_deref().is_some_and(|codec| codec != "none")
    }

    /// Exact size when known, otherwise yt-dlp's estimate
    pub fn size_bytes(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    fn in_video_container(&self) -> bool {
        self.ext.as_deref().is_some_and(|ext| VIDEO_CONTAINERS.contains(&ext))
    }
}

/// Media metadata returned by `yt-dlp -J`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub live_status: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatEntry>,
}

impl MediaInfo {
    /// Parses `yt-dlp -J` output.
    ///
    /// Some extractors return a single-format document without a `formats`
    /// array; its top-level fields are then treated as the only format.
    pub fn from_json_str(json: &str) -> Result<Self, DownloadError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| DownloadError::Parse(format!("Invalid yt-dlp JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DownloadError> {
        let mut info: MediaInfo = serde_json::from_value(value.clone())
            .map_err(|e| DownloadError::Parse(format!("Unexpected yt-dlp JSON: {}", e)))?;

        if info.formats.is_empty() && value.get("format_id").is_some() {
            if let Ok(single) = serde_json::from_value::<FormatEntry>(value) {
                info.formats.push(single);
            }
        }

        Ok(info)
    }

    pub fn is_live(&self) -> bool {
        self.is_live == Some(true) || self.live_status.as_deref() == Some("is_live")
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or("Untitled")
    }
}

/// Formats that carry a video stream
pub fn video_formats(info: &MediaInfo) -> Vec<&FormatEntry> {
    info.formats.iter().filter(|f| f.has_video()).collect()
}

/// One quality button
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOption {
    /// Ladder rung, e.g. 720
    pub height: u32,
    /// Short side of the chosen format (may be below the rung, or above the top rung)
    pub actual_height: u32,
    pub format_id: String,
    /// Size in bytes including the audio track when it has to be merged
    pub size_bytes: Option<u64>,
    /// True when `size_bytes` is an exact size rather than an estimate
    pub size_is_exact: bool,
    /// False for video-only formats that need `+bestaudio`
    pub has_audio: bool,
}

impl QualityOption {
    /// "720p", or the real resolution when it exceeds the top rung ("2160p")
    pub fn quality(&self) -> String {
        format!("{}p", self.height.max(self.actual_height))
    }

    /// Button label, e.g. "720p (12.35 MB)"
    pub fn label(&self) -> String {
        match self.size_bytes {
            Some(size) => format!("{} ({} MB)", self.quality(), format_megabytes(size)),
            None => self.quality(),
        }
    }
}

/// Resolution class of a format: the shorter frame side, so a vertical
/// 1080x1920 clip counts as 1080p. Falls back to the height when the width
/// is unknown.
fn short_side(format: &FormatEntry) -> Option<u32> {
    let height = format.height.filter(|&h| h > 0)?;
    Some(match format.width {
        Some(width) if width > 0 => width.min(height),
        _ => height,
    })
}

/// Picks at most one format per ladder rung.
///
/// Formats are bucketed by their short side. A lower rung R takes short
/// sides in (next lower rung, R]; the top rung also takes everything above
/// it. Within a rung, formats that fit under R win over taller ones and the
/// closest to R wins, then the highest tbr. Only formats in a playable
/// container are considered.
pub fn select_quality_options(info: &MediaInfo) -> Vec<QualityOption> {
    let best_audio_size = info
        .formats
        .iter()
        .filter(|f| f.is_audio_only())
        .filter_map(FormatEntry::size_bytes)
        .max();

    let candidates: Vec<(&FormatEntry, u32)> = video_formats(info)
        .into_iter()
        .filter(|f| f.in_video_container())
        .filter_map(|f| short_side(f).map(|side| (f, side)))
        .collect();

    let mut options = Vec::new();
    for (idx, &rung) in QUALITY_LADDER.iter().enumerate() {
        let floor = QUALITY_LADDER.get(idx + 1).copied().unwrap_or(0);
        let open_top = idx == 0;

        // Higher rank wins: fitting formats rank by side, taller ones by closeness
        let rank = |side: u32| -> (bool, i64) {
            if side <= rung {
                (true, i64::from(side))
            } else {
                (false, -i64::from(side))
            }
        };

        let best = candidates
            .iter()
            .filter(|(_, side)| *side > floor && (open_top || *side <= rung))
            .max_by(|(a, a_side), (b, b_side)| {
                rank(*a_side)
                    .cmp(&rank(*b_side))
                    .then_with(|| a.tbr.unwrap_or(0.0).total_cmp(&b.tbr.unwrap_or(0.0)))
            });

        let Some(&(format, side)) = best else {
            continue;
        };

        let has_audio = format.has_audio();
        let (size_bytes, size_is_exact) = match (format.size_bytes(), has_audio) {
            (Some(size), true) => (Some(size), format.filesize.is_some()),
            (Some(size), false) => (Some(size.saturating_add(best_audio_size.unwrap_or(0))), false),
            (None, _) => (None, false),
        };

        options.push(QualityOption {
            height: rung,
            actual_height: side,
            format_id: format.format_id.clone(),
            size_bytes,
            size_is_exact,
            has_audio,
        });
    }

    options
}
