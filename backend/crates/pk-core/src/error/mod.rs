use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Type {value} is not allowed as swim lane separator {location}")]
    UnsupportedAttributeKind {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid event type: {value} {location}")]
    InvalidEventType { value: i32, location: ErrorLocation },

    #[error("Duplicate option value {value} in attribute {attribute} {location}")]
    DuplicateOptionValue {
        attribute: String,
        value: i32,
        location: ErrorLocation,
    },

    #[error("Malformed XML: {message} {location}")]
    Xml {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid board configuration blob: {message} {location}")]
    ConfigBlob {
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON error: {source} {location}")]
    Json {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn xml<S: Into<String>>(message: S) -> Self {
        Self::Xml {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn config_blob<S: Into<String>>(message: S) -> Self {
        Self::ConfigBlob {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
