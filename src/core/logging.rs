//! Logging initialization
//!
//! Every record goes to the terminal (stderr for warnings and errors) and,
//! when `LOG_FILE_PATH` is set, to a log file as well. Records are written as
//! they are produced, so container log collectors see them immediately.

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;
use std::str::FromStr;

/// Parses a level name, falling back to `Info` on anything unknown
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Initialize logger for console and (optionally) file output
///
/// # Arguments
/// * `level` - Level filter name, e.g. "info"
/// * `log_file_path` - Optional path to the log file (appended to)
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the log file or a logger was already set
pub fn init_logger(level: &str, log_file_path: Option<&str>) -> Result<()> {
    let level = parse_level(level);
    let config = ConfigBuilder::new()
        // teloxide and reqwest are chatty at debug level
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file_path {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path, e))?;
        loggers.push(WriteLogger::new(level, config, log_file));
    }

    CombinedLogger::init(loggers).map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
