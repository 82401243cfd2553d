//! Plain text messages: link detection and the quality keyboard

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::core::validation::detect_supported_url;
use crate::download::pipeline::PrepareOutcome;
use crate::telegram::keyboard::quality_keyboard;
use crate::telegram::texts;

/// Handle a non-command text message
pub(super) async fn handle_link_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    if detect_supported_url(text).is_none() {
        log::debug!("No supported link in message from chat {}", chat_id);
        bot.send_message(chat_id, texts::unsupported_text()).await?;
        return Ok(());
    }

    let status = bot.send_message(chat_id, texts::FETCHING_FORMATS).await?;

    let reply = match deps.pipeline.prepare(text, chat_id.0).await {
        Ok(PrepareOutcome::Choices {
            token, title, options, ..
        }) => {
            bot.edit_message_text(chat_id, status.id, texts::choices_text(&title))
                .reply_markup(quality_keyboard(&token, &options))
                .await?;
            return Ok(());
        }
        Ok(PrepareOutcome::Unsupported) => texts::unsupported_text(),
        Ok(PrepareOutcome::LiveStream) => texts::LIVE_STREAM.to_string(),
        Ok(PrepareOutcome::NoFormats) => texts::NO_VIDEO_FORMATS.to_string(),
        Err(e) => {
            log::error!("Failed to fetch formats for chat {}: {}", chat_id, e);
            texts::FETCH_FAILED.to_string()
        }
    };

    bot.edit_message_text(chat_id, status.id, reply).await?;
    Ok(())
}
