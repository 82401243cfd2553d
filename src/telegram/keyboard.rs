use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::download::formats::QualityOption;
use crate::download::source::AudioFormat;
use crate::storage::pending::RequestToken;
use crate::telegram::callback::CallbackAction;

pub fn keyboard_stats(keyboard: &InlineKeyboardMarkup) -> (usize, usize) {
    let rows = keyboard.inline_keyboard.len();
    let buttons = keyboard.inline_keyboard.iter().map(|row| row.len()).sum();
    (rows, buttons)
}

fn button(label: impl Into<String>, action: &CallbackAction) -> Option<InlineKeyboardButton> {
    match action.encode_checked() {
        Some(data) => Some(InlineKeyboardButton::callback(label, data)),
        None => {
            log::warn!("Skipping button, callback data too long: {:?}", action);
            None
        }
    }
}

/// Quality choice keyboard: one row per quality, then audio and cancel rows
pub fn quality_keyboard(token: &RequestToken, options: &[QualityOption]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .filter_map(|option| {
            let action = CallbackAction::Video {
                token: token.clone(),
                format_id: option.format_id.clone(),
            };
            button(option.label(), &action).map(|b| vec![b])
        })
        .collect();

    for format in [AudioFormat::Mp3, AudioFormat::M4a] {
        let action = CallbackAction::Audio {
            token: token.clone(),
            format,
        };
        let label = format!("Download Audio ({})", format.as_str().to_uppercase());
        if let Some(b) = button(label, &action) {
            rows.push(vec![b]);
        }
    }

    if let Some(b) = button("Cancel", &CallbackAction::Cancel { token: token.clone() }) {
        rows.push(vec![b]);
    }

    InlineKeyboardMarkup::new(rows)
}
