//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::texts;

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let settings = deps.pipeline.settings();
    bot.send_message(msg.chat.id, texts::start_text(settings.max_file_size))
        .await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let settings = deps.pipeline.settings();
    bot.send_message(
        msg.chat.id,
        texts::help_text(settings.max_file_size, settings.cleanup_delay),
    )
    .await?;
    Ok(())
}
