use crate::models::label::LabelCollection;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeDescriptor {
    #[serde(rename = "LogicalName")]
    pub logical_name: String,
    #[serde(rename = "AttributeType")]
    pub attribute_type: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: LabelCollection,
}

/// The subset of entity metadata the board relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityMetadata {
    #[serde(rename = "LogicalName")]
    pub logical_name: String,
    #[serde(rename = "PrimaryIdAttribute")]
    pub primary_id_attribute: String,
    #[serde(rename = "PrimaryNameAttribute", default)]
    pub primary_name_attribute: Option<String>,
    #[serde(rename = "EntitySetName", default)]
    pub entity_set_name: Option<String>,
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<AttributeDescriptor>,
}

impl EntityMetadata {
    /// Case-insensitive attribute lookup.
    pub fn attribute(&self, logical_name: &str) -> Option<&AttributeDescriptor> {
        self.attributes
            .iter()
            .find(|a| a.logical_name.eq_ignore_ascii_case(logical_name))
    }

    pub fn display_name_of<'a>(&'a self, field: &'a str) -> &'a str {
        self.attribute(field)
            .map(|a| a.display_name.text())
            .filter(|l| !l.is_empty())
            .unwrap_or(field)
    }

    /// Entity set used in relationship bindings, falling back to the logical name.
    pub fn set_name(&self) -> &str {
        self.entity_set_name.as_deref().unwrap_or(&self.logical_name)
    }
}
