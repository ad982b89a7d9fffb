//! JSON rendering of board state for stdout.

use pk_board::{NotificationIndex, SubscriptionIndex};
use pk_core::{BoardConfigSummary, BoardLane, CardForm, Record, field_text, record_id};

use serde_json::{Map, Value, json};

const FORMATTED_VALUE: &str = "@OData.Community.Display.V1.FormattedValue";

/// What a card shows for `field`: the host's formatted value when present.
pub fn display_value(record: &Record, field: &str) -> Option<String> {
    let lookup = format!("_{field}_value");
    [
        format!("{field}{FORMATTED_VALUE}"),
        format!("{lookup}{FORMATTED_VALUE}"),
        field.to_string(),
        lookup,
    ]
    .iter()
    .filter_map(|key| record.get(key))
    .find(|value| !value.is_null())
    .map(field_text)
}

/// Fields a card displays: the card form's cells, or just the primary name.
pub fn card_fields(form: Option<&CardForm>, primary_name: Option<&str>) -> Vec<String> {
    match form.map(|f| f.parsed.fields()) {
        Some(fields) if !fields.is_empty() => fields,
        _ => primary_name.map(String::from).into_iter().collect(),
    }
}

/// Per-card annotations drawn from the notification and subscription indexes.
pub struct CardDecorations<'a> {
    pub notifications: &'a NotificationIndex,
    pub subscriptions: &'a SubscriptionIndex,
}

impl CardDecorations<'_> {
    fn notification_count(&self, id: &str) -> usize {
        self.notifications.get(id).map_or(0, Vec::len)
    }

    fn subscribed(&self, id: &str) -> bool {
        self.subscriptions.get(id).is_some_and(|s| !s.is_empty())
    }
}

pub fn card_json(
    record: &Record,
    id_attribute: &str,
    fields: &[String],
    decorations: &CardDecorations<'_>,
) -> Value {
    let id = record_id(record, id_attribute).unwrap_or_default();

    let mut values = Map::new();
    for field in fields {
        let value = display_value(record, field).map_or(Value::Null, Value::String);
        values.insert(field.clone(), value);
    }

    json!({
        "id": id,
        "fields": values,
        "notifications": decorations.notification_count(&id),
        "subscribed": decorations.subscribed(&id),
    })
}

pub fn lane_json(
    lane: &BoardLane,
    id_attribute: &str,
    fields: &[String],
    decorations: &CardDecorations<'_>,
) -> Value {
    let cards: Vec<Value> = lane
        .data
        .iter()
        .map(|record| card_json(record, id_attribute, fields, decorations))
        .collect();

    json!({
        "value": lane.value(),
        "label": lane.label(),
        "color": lane.option.as_ref().and_then(|o| o.color.clone()),
        "count": lane.len(),
        "cards": cards,
    })
}

pub fn lanes_json(
    lanes: &[BoardLane],
    id_attribute: &str,
    fields: &[String],
    decorations: &CardDecorations<'_>,
) -> Value {
    Value::Array(
        lanes
            .iter()
            .map(|lane| lane_json(lane, id_attribute, fields, decorations))
            .collect(),
    )
}

pub fn configurations_json(configs: &[BoardConfigSummary], default_id: Option<&str>) -> Value {
    Value::Array(
        configs
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "displayName": c.display_name,
                    "default": default_id.is_some_and(|d| d.eq_ignore_ascii_case(&c.id)),
                })
            })
            .collect(),
    )
}
