use crate::ClientError;

use pk_board::BoardError;
use pk_config::ConfigError;
use pk_notify::NotifyError;

use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Anything that stops a `pk` command
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("{source}")]
    Client {
        #[from]
        source: ClientError,
    },

    #[error("{source}")]
    Board {
        #[from]
        source: BoardError,
    },

    #[error("{source}")]
    Notify {
        #[from]
        source: NotifyError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}

impl CliError {
    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::Client {
            source: ClientError::from_json(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
