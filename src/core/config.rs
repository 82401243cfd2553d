use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the bot
///
/// Values are read once from the environment at first use. `.env` is loaded
/// in `main` before anything here is touched.

/// Returns the trimmed value of an env var, treating blank values as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Resolves the bot token from the first non-empty candidate variable.
///
/// Hosting platforms disagree on the name, so `BOT_TOKEN`,
/// `TELEGRAM_BOT_TOKEN` and `TELOXIDE_TOKEN` are all accepted, in that order.
pub fn resolve_bot_token(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["BOT_TOKEN", "TELEGRAM_BOT_TOKEN", "TELOXIDE_TOKEN"]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Bot token
/// Empty when none of the token variables is set
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| resolve_bot_token(|name| env::var(name).ok()).unwrap_or_default());

/// Custom Bot API server URL (local telegram-bot-api), if any
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("BOT_API_URL"));

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| non_empty_var("YTDL_BIN").unwrap_or_else(|| "yt-dlp".to_string()));

/// Root directory for per-request temporary folders
/// Read from TEMP_FILES_DIR environment variable, defaults to the OS temp dir
pub static TEMP_FILES_DIR: Lazy<PathBuf> =
    Lazy::new(|| non_empty_var("TEMP_FILES_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir));

/// Log file path
/// Read from LOG_FILE_PATH environment variable. Console only when unset.
pub static LOG_FILE_PATH: Lazy<Option<String>> = Lazy::new(|| non_empty_var("LOG_FILE_PATH"));

/// Log level filter ("error", "warn", "info", "debug", "trace")
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));

/// Download configuration
pub mod download {
    use super::Duration;

    /// Bot API upload limit for regular bots (50 MB)
    pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

    /// Delay before deleting downloaded files (in seconds)
    pub const FILE_CLEANUP_DELAY_SECS: u64 = 60;

    /// Timeout for yt-dlp metadata requests (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 120;

    /// Timeout for a single yt-dlp download, postprocessing included (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 15 * 60;

    /// File cleanup delay duration
    pub fn cleanup_delay() -> Duration {
        Duration::from_secs(FILE_CLEANUP_DELAY_SECS)
    }

    /// yt-dlp metadata timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }

    /// yt-dlp download timeout duration
    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Pending request configuration
pub mod pending {
    use super::Duration;

    /// Keyboards nobody pressed are forgotten after this many seconds
    pub const REQUEST_TTL_SECS: u64 = 60 * 60;

    /// Interval between sweeps of abandoned requests (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

    pub fn ttl() -> Duration {
        Duration::from_secs(REQUEST_TTL_SECS)
    }

    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Uploads of a 50 MB file over a slow link need a generous window
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
