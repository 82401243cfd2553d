use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use tgdl::cli::{AudioArg, Cli, Commands};
use tgdl::core::utils::format_megabytes;
use tgdl::core::validation::detect_supported_url;
use tgdl::core::{config, init_logger};
use tgdl::download::formats::select_quality_options;
use tgdl::download::source::{DownloadKind, DownloadRequest, MediaDownloader};
use tgdl::download::{Pipeline, PipelineSettings, YtDlp};
use tgdl::storage::PendingRequests;
use tgdl::telegram::{create_bot, distribution_key, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation) or a
/// CLI subcommand fails.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics instead of losing them in a detached task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env must be loaded before the config statics are first read
    let _ = dotenv();

    init_logger(&config::LOG_LEVEL, config::LOG_FILE_PATH.as_deref())?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Info { url }) => run_cli_info(&url).await,
        Some(Commands::Download {
            url,
            format_id,
            audio,
            output,
        }) => run_cli_download(&url, format_id, audio, output).await,
        Some(Commands::CheckYtdlp) => run_check_ytdlp().await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Starts the bot with long polling and keeps it running
async fn run_bot() -> Result<()> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN environment variable is required.");
    }

    let bot = create_bot(&config::BOT_TOKEN, config::BOT_API_URL.as_deref())?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let ytdlp = YtDlp::from_config();
    match ytdlp.version().await {
        Ok(version) => log::info!("Using {} {}", ytdlp.bin(), version),
        Err(e) => log::warn!("yt-dlp check failed ({}): {}. Downloads will fail until it is installed.", ytdlp.bin(), e),
    }

    let settings = PipelineSettings::from_config();
    log::info!(
        "Limits: max file size {} MB, cleanup after {:?}, temp dir {}",
        format_megabytes(settings.max_file_size),
        settings.cleanup_delay,
        settings.temp_root.display()
    );

    let pipeline = Arc::new(Pipeline::new(Arc::new(ytdlp), Arc::new(PendingRequests::new()), settings));
    let _sweeper = pipeline.spawn_sweeper();

    let handler = schema(HandlerDeps::new(pipeline));

    log::info!("Bot started. Press Ctrl+C to stop.");

    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;
    let mut retry_count = 0;

    // Run the dispatcher with retry logic
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Run the dispatcher in a separate task to isolate panics
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            // Updates sent while the bot was down are dropped
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .distribution_function(distribution_key)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Retrying dispatcher after panic (attempt {}/{})...",
                    retry_count,
                    max_retries
                );
                sleep(retry_delay(retry_count)).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }

    Ok(())
}

/// Linear backoff between dispatcher restarts
fn retry_delay(attempt: u32) -> Duration {
    config::retry::dispatcher_delay() * attempt
}

/// Prints what the bot would offer for a link
async fn run_cli_info(text: &str) -> Result<()> {
    let (url, platform) = detect_supported_url(text).context("Unsupported URL")?;
    let ytdlp = YtDlp::from_config();
    let info = ytdlp.extract_info(&url).await?;

    println!("Platform: {}", platform);
    println!("Title: {}", info.display_title());
    if let Some(duration) = info.duration {
        println!("Duration: {:.0}s", duration);
    }
    if info.is_live() {
        println!("Live stream: yes (the bot refuses these)");
    }

    let options = select_quality_options(&info);
    if options.is_empty() {
        println!("No quality options.");
    }
    for option in options {
        let note = if option.has_audio { "" } else { " +bestaudio" };
        println!("  {:>10}  {}{}", option.format_id, option.label(), note);
    }
    Ok(())
}

/// Downloads a link locally the same way a button press would
async fn run_cli_download(
    text: &str,
    format_id: Option<String>,
    audio: Option<AudioArg>,
    output: PathBuf,
) -> Result<()> {
    let (url, _) = detect_supported_url(text).context("Unsupported URL")?;
    let ytdlp = YtDlp::from_config();

    let kind = match audio {
        Some(format) => DownloadKind::Audio(format.into()),
        None => {
            let info = ytdlp.extract_info(&url).await?;
            let options = select_quality_options(&info);
            match format_id {
                Some(id) => {
                    let has_audio = match options.iter().find(|o| o.format_id == id) {
                        Some(option) => option.has_audio,
                        None => info.formats.iter().any(|f| f.format_id == id && f.has_audio()),
                    };
                    DownloadKind::Video {
                        format_id: id,
                        merge_audio: !has_audio,
                    }
                }
                None => {
                    let best = options.first().context("No video formats found.")?;
                    println!("Using {}", best.label());
                    DownloadKind::Video {
                        format_id: best.format_id.clone(),
                        merge_audio: !best.has_audio,
                    }
                }
            }
        }
    };

    tokio::fs::create_dir_all(&output)
        .await
        .with_context(|| format!("Cannot create {}", output.display()))?;

    let request = DownloadRequest {
        url,
        kind,
        output_dir: output,
    };
    let path = ytdlp.download(&request).await?;
    let size = tokio::fs::metadata(&path).await?.len();

    println!("{} ({} MB)", path.display(), format_megabytes(size));
    if size > config::download::MAX_FILE_SIZE_BYTES {
        println!(
            "Note: larger than the {} MB upload limit, the bot would not send this file.",
            format_megabytes(config::download::MAX_FILE_SIZE_BYTES)
        );
    }
    Ok(())
}

/// Verifies yt-dlp can be started
async fn run_check_ytdlp() -> Result<()> {
    let ytdlp = YtDlp::from_config();
    let version = ytdlp
        .version()
        .await
        .with_context(|| format!("Failed to run {}", ytdlp.bin()))?;
    println!("{} {}", ytdlp.bin(), version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_grows_linearly() {
        let base = config::retry::dispatcher_delay();
        assert_eq!(retry_delay(1), base);
        assert_eq!(retry_delay(3), base * 3);
    }
}
