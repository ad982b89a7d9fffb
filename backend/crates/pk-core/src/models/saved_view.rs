use crate::CoreResult;
use crate::query::fetch_query::FetchQuery;
use crate::xml;

use serde::{Deserialize, Serialize};

/// A system view the user can pick as the board's base query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedView {
    #[serde(rename = "savedqueryid")]
    pub id: String,
    pub name: String,
    #[serde(rename = "fetchxml")]
    pub fetch_xml: String,
    #[serde(rename = "layoutxml", default)]
    pub layout_xml: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkedEntity {
    pub entity_name: String,
    pub alias: Option<String>,
}

/// What a selected view contributes: its query, grid columns and joins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewDefinition {
    pub query: FetchQuery,
    pub columns: Vec<String>,
    pub link_entities: Vec<LinkedEntity>,
}

impl SavedView {
    pub fn definition(&self) -> CoreResult<ViewDefinition> {
        let query = FetchQuery::parse(&self.fetch_xml)?;

        let columns = if self.layout_xml.trim().is_empty() {
            Vec::new()
        } else {
            xml::parse(&self.layout_xml)?
                .descendants_named("cell")
                .into_iter()
                .filter_map(|c| c.attribute("name").map(str::to_string))
                .collect()
        };

        let link_entities = xml::parse(&self.fetch_xml)?
            .descendants_named("link-entity")
            .into_iter()
            .filter_map(|l| {
                l.attribute("name").map(|name| LinkedEntity {
                    entity_name: name.to_string(),
                    alias: l.attribute("alias").map(str::to_string),
                })
            })
            .collect();

        Ok(ViewDefinition {
            query,
            columns,
            link_entities,
        })
    }
}
