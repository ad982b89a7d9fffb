use crate::models::entity_reference::EntityReference;
use crate::models::event_type::EventType;
use crate::models::record::{Record, lookup_value, normalize_id};
use crate::{CoreError, CoreResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Audit fields never worth showing as "changed".
const HIDDEN_FIELDS: [&str; 4] = ["createdby", "modifiedon", "modifiedby", "modifiedonbehalfby"];

/// JSON payload written by the notification producer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPayload {
    #[serde(rename = "updatedFields", default, deserialize_with = "null_as_empty")]
    pub updated_fields: Vec<String>,
    #[serde(rename = "eventRecordReference")]
    pub event_record_reference: EntityReference,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub event: EventType,
    pub owner_id: Option<String>,
    /// Record the notification hangs off (the notification lookup's target).
    pub parent_id: Option<String>,
    pub data: String,
    pub parsed: NotificationPayload,
    pub created_on: Option<DateTime<Utc>>,
}

impl Notification {
    pub const ID_FIELD: &'static str = "oss_notificationid";
    pub const EVENT_FIELD: &'static str = "oss_event";
    pub const DATA_FIELD: &'static str = "oss_data";

    /// Read a notification row. `parent_lookup` is the lookup the row was fetched through.
    #[track_caller]
    pub fn from_record(record: &Record, parent_lookup: &str) -> CoreResult<Self> {
        let id = record
            .get(Self::ID_FIELD)
            .and_then(Value::as_str)
            .map(normalize_id)
            .ok_or_else(|| CoreError::validation("notification without id"))?;

        let event = record
            .get(Self::EVENT_FIELD)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| CoreError::validation(format!("notification {id} without event")))?;
        let event = EventType::try_from(event)?;

        let data = record
            .get(Self::DATA_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parsed: NotificationPayload = serde_json::from_str(&data)?;

        let created_on = record
            .get("createdon")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));

        Ok(Self {
            id,
            event,
            owner_id: lookup_value(record, "ownerid"),
            parent_id: lookup_value(record, parent_lookup),
            data,
            parsed,
            created_on,
        })
    }

    /// Id of the record whose change raised this notification.
    pub fn target_id(&self) -> String {
        self.parsed.event_record_reference.normalized_id()
    }

    /// Changed fields worth showing, without audit fields and the record's own id.
    pub fn displayed_fields(&self, primary_id_attribute: &str) -> Vec<&str> {
        self.parsed
            .updated_fields
            .iter()
            .map(String::as_str)
            .filter(|f| !HIDDEN_FIELDS.contains(f) && *f != primary_id_attribute)
            .collect()
    }
}
