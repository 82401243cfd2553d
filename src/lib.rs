//! tgdl - Telegram bot that downloads videos and audio with yt-dlp
//!
//! A user sends a link, picks a quality from an inline keyboard, and gets
//! the file back if it fits Telegram's upload limit.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and shared helpers
//! - `download`: Format selection, yt-dlp backend and the request pipeline
//! - `storage`: In-memory pending request registry
//! - `telegram`: Bot setup, keyboards and handlers
//! - `cli`: Command-line interface

pub mod cli;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{Pipeline, PipelineSettings};
