use crate::{CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// What happened to a watched record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i32", into = "i32")]
pub enum EventType {
    Update = 863_910_000,
    Create = 863_910_001,
    Assign = 863_910_002,
    Delete = 863_910_003,
    UserMention = 863_910_004,
}

impl EventType {
    /// Map a platform message name. Unknown messages count as mentions.
    pub fn from_message_name(message: &str) -> Self {
        match message.to_lowercase().as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "assign" => Self::Assign,
            "delete" => Self::Delete,
            _ => Self::UserMention,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Update => "update",
            Self::Create => "create",
            Self::Assign => "assign",
            Self::Delete => "delete",
            Self::UserMention => "user_mention",
        }
    }
}

impl From<EventType> for i32 {
    fn from(event: EventType) -> Self {
        event as i32
    }
}

impl TryFrom<i32> for EventType {
    type Error = CoreError;

    #[track_caller]
    fn try_from(value: i32) -> CoreResult<Self> {
        match value {
            863_910_000 => Ok(Self::Update),
            863_910_001 => Ok(Self::Create),
            863_910_002 => Ok(Self::Assign),
            863_910_003 => Ok(Self::Delete),
            863_910_004 => Ok(Self::UserMention),
            _ => Err(CoreError::InvalidEventType {
                value,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
