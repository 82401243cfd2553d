//! Inline button payloads
//!
//! Layout is `KIND|token|arg`:
//! - `DL|<token>|<format_id>` downloads a video format
//! - `AUDIO|<token>|mp3` / `AUDIO|<token>|m4a` extracts audio
//! - `CANCEL|<token>` drops the request
//!
//! Telegram rejects callback data longer than 64 bytes, so buttons whose
//! payload would not fit are left out of the keyboard.

use crate::download::source::AudioFormat;
use crate::storage::pending::RequestToken;

/// Telegram's limit for `callback_data`
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Video { token: RequestToken, format_id: String },
    Audio { token: RequestToken, format: AudioFormat },
    Cancel { token: RequestToken },
}

impl CallbackAction {
    pub fn token(&self) -> &RequestToken {
        match self {
            CallbackAction::Video { token, .. } | CallbackAction::Audio { token, .. } | CallbackAction::Cancel { token } => {
                token
            }
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Video { token, format_id } => format!("DL|{}|{}", token, format_id),
            CallbackAction::Audio { token, format } => format!("AUDIO|{}|{}", token, format.as_str()),
            CallbackAction::Cancel { token } => format!("CANCEL|{}", token),
        }
    }

    /// Encoded payload, or `None` when it exceeds the Telegram limit
    pub fn encode_checked(&self) -> Option<String> {
        let data = self.encode();
        (data.len() <= MAX_CALLBACK_DATA_BYTES).then_some(data)
    }

    /// Parses callback data; anything malformed yields `None`
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(SEPARATOR);
        let kind = parts.next()?;
        let token = parts.next().filter(|t| !t.is_empty()).map(RequestToken::from)?;
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (kind, arg) {
            ("DL", Some(format_id)) if !format_id.is_empty() => Some(CallbackAction::Video {
                token,
                format_id: format_id.to_string(),
            }),
            ("AUDIO", Some(format)) => AudioFormat::parse(format).map(|format| CallbackAction::Audio { token, format }),
            ("CANCEL", None) => Some(CallbackAction::Cancel { token }),
            _ => None,
        }
    }
}
