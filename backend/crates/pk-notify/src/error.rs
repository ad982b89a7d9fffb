use pk_board::BoardError;

use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Producer configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to encode notification payload: {source} {location}")]
    Payload {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Board {
        #[from]
        source: BoardError,
    },
}

impl NotifyError {
    #[track_caller]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Payload {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, NotifyError>;
