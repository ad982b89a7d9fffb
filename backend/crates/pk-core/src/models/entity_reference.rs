use crate::models::record::normalize_id;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityReference {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "LogicalName", alias = "entityType")]
    pub logical_name: String,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    pub fn new(logical_name: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            logical_name: logical_name.to_string(),
            name: None,
        }
    }

    pub fn normalized_id(&self) -> String {
        normalize_id(&self.id)
    }
}
