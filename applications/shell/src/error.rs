/// Shell error types
use encore_core::EncoreError;
use encore_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("Invalid argument for `{command}`: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error(transparent)]
    Library(#[from] EncoreError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub(crate) fn invalid_argument(command: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
