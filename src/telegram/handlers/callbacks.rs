//! Quality keyboard button presses

use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InputFile};

use super::types::{HandlerDeps, HandlerError};
use crate::download::pipeline::{DownloadJob, JobOutcome, Pipeline, StartOutcome};
use crate::telegram::callback::CallbackAction;
use crate::telegram::texts;

/// Handle a pressed inline button
pub(super) async fn handle_download_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        log::debug!("Ignoring unknown callback data {:?}", q.data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let outcome = deps.pipeline.start(&action).await;

    let toast = match &outcome {
        Ok(StartOutcome::Busy) => Some(texts::BUSY.to_string()),
        Ok(StartOutcome::UnknownFormat) => Some(texts::UNKNOWN_FORMAT.to_string()),
        Ok(StartOutcome::Job(job)) => Some(texts::downloading_text(job)),
        _ => None,
    };
    let answer = bot.answer_callback_query(q.id.clone());
    match toast {
        Some(text) => answer.text(text).await?,
        None => answer.await?,
    };

    let edit_to = match outcome? {
        StartOutcome::Expired => texts::REQUEST_EXPIRED,
        StartOutcome::Cancelled => texts::CANCELLED,
        StartOutcome::Busy | StartOutcome::UnknownFormat => return Ok(()),
        StartOutcome::Job(job) => {
            let result = deliver(bot, &deps.pipeline, &job).await;
            deps.pipeline.finish(job).await;
            return result;
        }
    };

    if let Some(message) = &q.message {
        bot.edit_message_text(message.chat().id, message.id(), edit_to).await?;
    }
    Ok(())
}

/// Runs the job and sends the file, or the reason it can't be sent
async fn deliver(bot: &Bot, pipeline: &Pipeline, job: &DownloadJob) -> Result<(), HandlerError> {
    let chat_id = ChatId(job.chat_id);

    let file = match pipeline.run(job).await {
        Ok(JobOutcome::File(file)) => file,
        Ok(JobOutcome::TooLarge { size }) => {
            let text = texts::too_large_text(job, size, pipeline.settings().max_file_size);
            bot.send_message(chat_id, text).await?;
            return Ok(());
        }
        Err(e) => {
            let category = e.as_download().map_or("other", |d| d.subcategory());
            log::error!("Download of {} ({}) failed [{}]: {}", job.url, job.describe(), category, e);
            bot.send_message(chat_id, texts::download_failed_text(&e)).await?;
            return Ok(());
        }
    };

    let caption = texts::caption(job, file.size);
    log::info!("Uploading {} ({} bytes) to chat {}", file.path.display(), file.size, chat_id);

    if job.kind.is_audio() {
        bot.send_audio(chat_id, InputFile::file(&file.path))
            .caption(caption)
            .await?;
    } else {
        bot.send_video(chat_id, InputFile::file(&file.path))
            .caption(caption)
            .await?;
    }
    Ok(())
}
