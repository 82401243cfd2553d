use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::download::source::AudioFormat;

#[derive(Parser, Debug)]
#[command(name = "tgdl")]
#[command(author, version, about = "Telegram bot that downloads videos and audio with yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Print the quality options the bot would offer for a link
    Info {
        /// Video link
        url: String,
    },

    /// Download a link locally the same way the bot would
    Download {
        /// Video link
        url: String,

        /// Video format id (see `info`); defaults to the best offered quality
        #[arg(short, long, conflicts_with = "audio")]
        format_id: Option<String>,

        /// Extract audio instead of video
        #[arg(short, long, value_enum)]
        audio: Option<AudioArg>,

        /// Directory to write the file to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Check that yt-dlp can be started and print its version
    CheckYtdlp,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioArg {
    Mp3,
    M4a,
}

impl From<AudioArg> for AudioFormat {
    fn from(value: AudioArg) -> Self {
        match value {
            AudioArg::Mp3 => AudioFormat::Mp3,
            AudioArg::M4a => AudioFormat::M4a,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
