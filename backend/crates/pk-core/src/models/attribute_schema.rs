use crate::models::attribute_kind::AttributeKind;
use crate::models::picklist_option::PicklistOption;
use crate::models::transition::parse_transition_data;
use crate::{CoreError, CoreResult};

use std::collections::HashSet;
use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Companion field written together with a `Status` discriminator.
pub const STATE_FIELD: &str = "statecode";

/// A resolved swim-lane discriminator: its kind and its options in lane order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeSchema {
    pub entity: String,
    pub logical_name: String,
    pub kind: AttributeKind,
    /// Options in lane order. Boolean schemas hold exactly `[false, true]`.
    pub options: Vec<PicklistOption>,
    /// Field that must be written alongside this one, set to the target option's `State`.
    pub state_companion: Option<String>,
}

impl AttributeSchema {
    /// Build a schema for an option-set attribute (picklist, status or state).
    ///
    /// Options are ordered by `(State, Value)` and their transition data is decoded.
    #[track_caller]
    pub fn new(
        entity: &str,
        logical_name: &str,
        kind: AttributeKind,
        options: Vec<PicklistOption>,
    ) -> CoreResult<Self> {
        if kind.is_boolean() {
            return Err(CoreError::validation(format!(
                "Boolean attribute {logical_name} needs explicit true and false options"
            )));
        }

        let mut options = options;
        options.sort_by_key(|o| (o.state, o.value));

        Self::build(entity, logical_name, kind, options)
    }

    /// Build a two-lane schema for a boolean attribute.
    #[track_caller]
    pub fn boolean(
        entity: &str,
        logical_name: &str,
        false_option: PicklistOption,
        true_option: PicklistOption,
    ) -> CoreResult<Self> {
        Self::build(
            entity,
            logical_name,
            AttributeKind::Boolean,
            vec![false_option, true_option],
        )
    }

    #[track_caller]
    fn build(
        entity: &str,
        logical_name: &str,
        kind: AttributeKind,
        mut options: Vec<PicklistOption>,
    ) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for option in &mut options {
            if !seen.insert(option.value) {
                return Err(CoreError::DuplicateOptionValue {
                    attribute: logical_name.to_string(),
                    value: option.value,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            option.allowed_transitions = parse_transition_data(option.transition_data.as_deref());
        }

        let state_companion = match kind {
            AttributeKind::Status => Some(STATE_FIELD.to_string()),
            _ => None,
        };

        Ok(Self {
            entity: entity.to_string(),
            logical_name: logical_name.to_string(),
            kind,
            options,
            state_companion,
        })
    }

    pub fn is_boolean(&self) -> bool {
        self.kind.is_boolean()
    }

    pub fn option(&self, value: i32) -> Option<&PicklistOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn lane_values(&self) -> Vec<i32> {
        self.options.iter().map(|o| o.value).collect()
    }

    /// The value to write into the discriminator field for `option`.
    pub fn field_value(&self, option: &PicklistOption) -> Value {
        if self.is_boolean() {
            Value::Bool(option.value != 0)
        } else {
            Value::from(option.value)
        }
    }

    /// The companion write required when moving to `target`, if any.
    pub fn companion_write(&self, target: &PicklistOption) -> Option<(&str, Value)> {
        self.state_companion
            .as_deref()
            .map(|field| (field, Value::from(target.state)))
    }
}
