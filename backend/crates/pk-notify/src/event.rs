use pk_core::{EntityReference, EventType, NotificationPayload, Record};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A create/update/assign/delete (or any other message) on a watched record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvent {
    pub message_name: String,
    /// The user who made the change.
    pub user_id: String,
    pub target: Option<EntityReference>,
    /// Attributes sent with the target. `None` when the message carried a bare reference.
    #[serde(default)]
    pub attributes: Option<Record>,
    /// Record state before the change, by image name. Lookups are `{ "Id", "LogicalName" }`.
    #[serde(default)]
    pub pre_images: BTreeMap<String, Record>,
}

impl RecordEvent {
    pub fn event_type(&self) -> EventType {
        EventType::from_message_name(&self.message_name)
    }

    pub fn updated_fields(&self) -> Vec<String> {
        self.attributes
            .as_ref()
            .map(|attributes| attributes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The JSON payload subscribers get, or `None` without a target.
    pub fn payload(&self) -> Option<NotificationPayload> {
        self.target.as_ref().map(|target| NotificationPayload {
            updated_fields: self.updated_fields(),
            event_record_reference: target.clone(),
        })
    }

    /// First non-empty value of `lookup` across the pre-images.
    pub fn pre_image_reference(&self, lookup: &str) -> Option<EntityReference> {
        self.pre_images
            .values()
            .filter_map(|image| image.get(lookup))
            .filter(|value| !value.is_null())
            .find_map(|value| serde_json::from_value::<EntityReference>(value.clone()).ok())
    }
}
