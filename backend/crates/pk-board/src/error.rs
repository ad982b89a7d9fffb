use pk_core::CoreError;

use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an error reaches the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    /// The board cannot be shown at all.
    Blocking,
    /// The operation failed; whatever was shown before stays visible.
    Alert,
}

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Customization script {url} failed to load: {message} {location}")]
    Customization {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Data access failed during {operation}: {message} {location}")]
    DataAccess {
        operation: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Transition hook {hook} failed: {message} {location}")]
    Hook {
        hook: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Core {
        #[from]
        source: CoreError,
    },
}

impl BoardError {
    #[track_caller]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn customization<S: Into<String>>(url: &str, message: S) -> Self {
        Self::Customization {
            url: url.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn data_access<S: Into<String>>(operation: &str, message: S) -> Self {
        Self::DataAccess {
            operation: operation.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn hook<S: Into<String>>(hook: &str, message: S) -> Self {
        Self::Hook {
            hook: hook.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Configuration { .. } | Self::Customization { .. } => Severity::Blocking,
            Self::Core { source } => match source {
                CoreError::Json { .. } | CoreError::InvalidEventType { .. } => Severity::Alert,
                _ => Severity::Blocking,
            },
            Self::DataAccess { .. } | Self::Hook { .. } | Self::NotFound { .. } => Severity::Alert,
        }
    }
}

pub type Result<T> = StdResult<T, BoardError>;
