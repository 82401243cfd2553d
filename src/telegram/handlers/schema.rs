//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message, UpdateKind};

use super::callbacks::handle_download_callback;
use super::commands::{handle_help_command, handle_start_command};
use super::messages::handle_link_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::texts;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and can be used in integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler(deps_commands))
        // Message handler for links
        .branch(message_handler(deps_messages))
        // Callback query handler
        .branch(callback_handler(deps_callback))
}

/// Dispatcher distribution key.
///
/// Messages of one chat are handled in order. Button presses get no key, so
/// they run concurrently: a press on a keyboard whose download is still
/// running gets its "already in progress" answer right away.
pub fn distribution_key(update: &Update) -> Option<ChatId> {
    match update.kind {
        UpdateKind::CallbackQuery(_) => None,
        _ => update.chat().map(|chat| chat.id),
    }
}

/// Logs a failed handler and tells the chat something went wrong
async fn report_failure(bot: &Bot, chat_id: Option<ChatId>, context: &str, err: HandlerError) {
    log::error!("Exception while handling {}: {}", context, err);
    let Some(chat_id) = chat_id else {
        return;
    };
    if let Err(e) = bot.send_message(chat_id, texts::UNEXPECTED_ERROR).await {
        log::error!("Failed to notify chat {} about error: {}", chat_id, e);
    }
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                let result = match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await,
                    Command::Help => handle_help_command(&bot, &msg, &deps).await,
                };
                if let Err(e) = result {
                    report_failure(&bot, Some(msg.chat.id), "command", e).await;
                }
                Ok(())
            }
        },
    ))
}

/// Text that isn't a command; other slash-prefixed text is left alone
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_link_message(&bot, &msg, &deps).await {
                    report_failure(&bot, Some(msg.chat.id), "message", e).await;
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_download_callback(&bot, &q, &deps).await {
                let chat_id = q.message.as_ref().map(|m| m.chat().id);
                report_failure(&bot, chat_id, "callback query", e).await;
            }
            Ok(())
        }
    })
}
