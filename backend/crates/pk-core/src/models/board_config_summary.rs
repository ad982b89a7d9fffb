use serde::{Deserialize, Serialize};

/// A stored board configuration as listed in the board picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfigSummary {
    #[serde(rename = "webresourceid")]
    pub id: String,
    pub name: String,
    #[serde(rename = "displayname", default)]
    pub display_name: Option<String>,
}
