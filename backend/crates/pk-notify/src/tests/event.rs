use crate::RecordEvent;

use pk_core::{EntityReference, EventType, Record};

use googletest::prelude::*;
use serde_json::json;

fn event(message: &str, attributes: Option<Record>) -> RecordEvent {
    RecordEvent {
        message_name: message.to_string(),
        user_id: "u1".to_string(),
        target: Some(EntityReference::new("incident", "C1")),
        attributes,
        ..RecordEvent::default()
    }
}

#[test]
fn given_message_names_when_classified_then_unknown_is_mention() {
    assert_that!(event("Update", None).event_type(), eq(EventType::Update));
    assert_that!(event("Assign", None).event_type(), eq(EventType::Assign));
    assert_that!(event("Merge", None).event_type(), eq(EventType::UserMention));
}

#[test]
fn given_target_attributes_when_payload_built_then_field_names_listed() {
    let mut attributes = Record::new();
    attributes.insert("title".to_string(), json!("Printer on fire"));
    attributes.insert("statuscode".to_string(), json!(2));

    let payload = event("Update", Some(attributes)).payload().unwrap();

    assert_eq!(
        payload.updated_fields,
        vec!["statuscode".to_string(), "title".to_string()]
    );
    assert_that!(payload.event_record_reference.logical_name.as_str(), eq("incident"));
}

#[test]
fn given_bare_reference_when_payload_built_then_no_fields() {
    let payload = event("Delete", None).payload().unwrap();

    assert!(payload.updated_fields.is_empty());
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "updatedFields": [],
            "eventRecordReference": { "Id": "C1", "LogicalName": "incident" }
        })
    );
}

#[test]
fn given_no_target_when_payload_built_then_none() {
    let event = RecordEvent {
        message_name: "Update".to_string(),
        ..RecordEvent::default()
    };

    assert!(event.payload().is_none());
}

#[test]
fn given_pre_images_when_parent_looked_up_then_first_set_value_wins() {
    let mut empty = Record::new();
    empty.insert("regardingobjectid".to_string(), json!(null));
    let mut filled = Record::new();
    filled.insert(
        "regardingobjectid".to_string(),
        json!({ "Id": "c7", "LogicalName": "incident" }),
    );
    let mut event = event("Update", None);
    event.pre_images.insert("a".to_string(), empty);
    event.pre_images.insert("b".to_string(), filled);

    let parent = event.pre_image_reference("regardingobjectid").unwrap();

    assert_that!(parent.id.as_str(), eq("c7"));
    assert_that!(event.pre_image_reference("customerid"), none());
}
