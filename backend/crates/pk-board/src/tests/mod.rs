
use pk_core::{AttributeKind, AttributeSchema, PicklistOption, Record};

use serde_json::{Value, json};

/// Open(1,active), Done(2,active), Closed(3,inactive) on `incident.statuscode`.
pub(crate) fn status_schema() -> AttributeSchema {
    AttributeSchema::new(
        "incident",
        "statuscode",
        AttributeKind::Status,
        vec![
            PicklistOption::new(1, 0, "Open"),
            PicklistOption::new(2, 0, "Done"),
            PicklistOption::new(3, 1, "Closed"),
        ],
    )
    .unwrap()
}

pub(crate) fn boolean_schema() -> AttributeSchema {
    AttributeSchema::boolean(
        "task",
        "oss_blocked",
        PicklistOption::new(0, 0, "No"),
        PicklistOption::new(1, 0, "Yes"),
    )
    .unwrap()
}

pub(crate) fn record(id: &str, field: &str, value: Value) -> Record {
    let mut record = Record::new();
    record.insert("incidentid".to_string(), json!(id));
    record.insert(field.to_string(), value);
    record
}
