use crate::{CoreError, CoreResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Attribute types that can separate a board into swim lanes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Picklist,
    Status,
    State,
    Boolean,
}

impl AttributeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Picklist => "Picklist",
            Self::Status => "Status",
            Self::State => "State",
            Self::Boolean => "Boolean",
        }
    }

    /// Metadata sub-type the host expects when expanding the option set.
    pub fn metadata_type(&self) -> &str {
        match self {
            Self::Picklist => "Microsoft.Dynamics.CRM.PicklistAttributeMetadata",
            Self::Status => "Microsoft.Dynamics.CRM.StatusAttributeMetadata",
            Self::State => "Microsoft.Dynamics.CRM.StateAttributeMetadata",
            Self::Boolean => "Microsoft.Dynamics.CRM.BooleanAttributeMetadata",
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

impl FromStr for AttributeKind {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "Picklist" => Ok(Self::Picklist),
            "Status" => Ok(Self::Status),
            "State" => Ok(Self::State),
            "Boolean" => Ok(Self::Boolean),
            _ => Err(CoreError::UnsupportedAttributeKind {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
