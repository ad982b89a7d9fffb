use crate::{AttributeKind, AttributeSchema, CoreError, PicklistOption, STATE_FIELD};

use std::str::FromStr;

use serde_json::json;

fn status_options() -> Vec<PicklistOption> {
    vec![
        PicklistOption::new(5, 1, "Resolved"),
        PicklistOption::new(2, 0, "On Hold"),
        PicklistOption::new(1, 0, "In Progress"),
        PicklistOption::new(6, 2, "Cancelled"),
    ]
}

#[test]
fn given_unordered_options_when_new_then_sorted_by_state_then_value() {
    let schema =
        AttributeSchema::new("incident", "statuscode", AttributeKind::Status, status_options())
            .unwrap();

    assert_eq!(schema.lane_values(), vec![1, 2, 5, 6]);
}

#[test]
fn given_status_attribute_when_companion_write_then_state_of_target() {
    let schema =
        AttributeSchema::new("incident", "statuscode", AttributeKind::Status, status_options())
            .unwrap();
    let target = schema.option(5).unwrap();

    let (field, value) = schema.companion_write(target).unwrap();

    assert_eq!(field, STATE_FIELD);
    assert_eq!(value, json!(1));
}

#[test]
fn given_picklist_attribute_when_companion_write_then_none() {
    let schema = AttributeSchema::new(
        "incident",
        "prioritycode",
        AttributeKind::Picklist,
        vec![PicklistOption::new(1, 0, "High")],
    )
    .unwrap();

    assert!(schema.companion_write(&schema.options[0]).is_none());
}

#[test]
fn given_duplicate_values_when_new_then_error() {
    let result = AttributeSchema::new(
        "incident",
        "prioritycode",
        AttributeKind::Picklist,
        vec![
            PicklistOption::new(1, 0, "High"),
            PicklistOption::new(1, 0, "Also High"),
        ],
    );

    assert!(matches!(
        result,
        Err(CoreError::DuplicateOptionValue { value: 1, .. })
    ));
}

#[test]
fn given_boolean_schema_when_field_value_then_json_bool() {
    let schema = AttributeSchema::boolean(
        "task",
        "oss_done",
        PicklistOption::new(0, 0, "No"),
        PicklistOption::new(1, 0, "Yes"),
    )
    .unwrap();

    assert_eq!(schema.lane_values(), vec![0, 1]);
    assert_eq!(schema.field_value(&schema.options[1]), json!(true));
    assert_eq!(schema.field_value(&schema.options[0]), json!(false));
}

#[test]
fn given_boolean_kind_when_new_then_rejected() {
    let result = AttributeSchema::new("task", "oss_done", AttributeKind::Boolean, Vec::new());

    assert!(result.is_err());
}

#[test]
fn given_transition_data_when_new_then_transitions_are_decoded() {
    let options = vec![
        PicklistOption::new(1, 0, "New").with_transition_data(
            r#"<allowedtransitions><allowedtransition sourcestatusid="1" tostatusid="2"/></allowedtransitions>"#,
        ),
        PicklistOption::new(2, 0, "Active"),
    ];

    let schema =
        AttributeSchema::new("incident", "statuscode", AttributeKind::Status, options).unwrap();

    assert!(schema.option(1).unwrap().allows_move_to(2));
    assert!(!schema.option(1).unwrap().allows_move_to(3));
    assert!(schema.option(2).unwrap().allows_move_to(1));
}

#[test]
fn given_unknown_attribute_type_when_parse_kind_then_error() {
    assert!(matches!(
        AttributeKind::from_str("String"),
        Err(CoreError::UnsupportedAttributeKind { .. })
    ));
    assert_eq!(AttributeKind::from_str("Status").unwrap(), AttributeKind::Status);
}
