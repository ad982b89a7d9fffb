use crate::{CoreError, CoreResult};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityConfig {
    pub logical_name: String,
    pub swim_lane_source: String,
    /// Lookup on the notification entity pointing at records of this entity.
    #[serde(default)]
    pub notification_lookup: Option<String>,
    /// Lookup on the subscription entity pointing at records of this entity.
    #[serde(default)]
    pub subscription_lookup: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryEntityConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    /// Lookup on the secondary entity pointing at its primary record.
    pub parent_lookup: String,
}

/// One board's configuration, immutable for a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub primary_entity: EntityConfig,
    #[serde(default)]
    pub secondary_entity: Option<SecondaryEntityConfig>,
    #[serde(default)]
    pub custom_script_url: Option<String>,
    /// Name of the transition hook to run before a lane change is committed.
    #[serde(default)]
    pub transition_callback: Option<String>,
    #[serde(default)]
    pub default_view_id: Option<String>,
    #[serde(default)]
    pub show_create_button: bool,
    #[serde(default)]
    pub show_delete_button: bool,
    #[serde(default)]
    pub show_deactivate_button: bool,
    #[serde(default)]
    pub hide_empty_lanes: bool,
}

impl BoardConfig {
    /// Decode the base64 JSON blob the host stores for a board.
    #[track_caller]
    pub fn from_encoded(blob: &str) -> CoreResult<Self> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| CoreError::config_blob(format!("not valid base64: {e}")))?;

        let config: BoardConfig = serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::config_blob(format!("not a board configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    #[track_caller]
    pub fn encode(&self) -> CoreResult<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if self.primary_entity.logical_name.trim().is_empty() {
            return Err(CoreError::config_blob("primaryEntity.logicalName is empty"));
        }
        if self.primary_entity.swim_lane_source.trim().is_empty() {
            return Err(CoreError::config_blob("primaryEntity.swimLaneSource is empty"));
        }
        if let Some(secondary) = &self.secondary_entity {
            if secondary.entity.logical_name.trim().is_empty() {
                return Err(CoreError::config_blob("secondaryEntity.logicalName is empty"));
            }
            if secondary.parent_lookup.trim().is_empty() {
                return Err(CoreError::config_blob("secondaryEntity.parentLookup is empty"));
            }
        }
        Ok(())
    }

    /// Entities whose records may be subscribed to, with their lookup names.
    pub fn subscription_lookups(&self) -> Vec<(&str, &str)> {
        self.entities()
            .filter_map(|e| {
                e.subscription_lookup
                    .as_deref()
                    .map(|l| (e.logical_name.as_str(), l))
            })
            .collect()
    }

    /// Entities that receive notifications, with their lookup names.
    pub fn notification_lookups(&self) -> Vec<(&str, &str)> {
        self.entities()
            .filter_map(|e| {
                e.notification_lookup
                    .as_deref()
                    .map(|l| (e.logical_name.as_str(), l))
            })
            .collect()
    }

    pub fn entity(&self, logical_name: &str) -> Option<&EntityConfig> {
        self.entities().find(|e| e.logical_name == logical_name)
    }

    fn entities(&self) -> impl Iterator<Item = &EntityConfig> {
        std::iter::once(&self.primary_entity)
            .chain(self.secondary_entity.as_ref().map(|s| &s.entity))
    }
}
