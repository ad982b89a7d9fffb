use crate::models::label::LabelCollection;
use crate::models::transition::Transition;

use serde::{Deserialize, Serialize};

/// One entry of a discriminator's option set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PicklistOption {
    #[serde(rename = "Value")]
    pub value: i32,
    /// 0 = active grouping, 1 = inactive grouping.
    #[serde(rename = "State", default)]
    pub state: i32,
    #[serde(rename = "Label", default)]
    pub label: LabelCollection,
    #[serde(rename = "Color", default)]
    pub color: Option<String>,
    #[serde(rename = "TransitionData", default)]
    pub transition_data: Option<String>,
    /// Decoded form of `transition_data`, filled in by the schema.
    #[serde(skip)]
    pub allowed_transitions: Option<Vec<Transition>>,
}

impl PicklistOption {
    pub fn new(value: i32, state: i32, label: &str) -> Self {
        Self {
            value,
            state,
            label: LabelCollection::from_text(label),
            color: None,
            transition_data: None,
            allowed_transitions: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_transition_data(mut self, data: &str) -> Self {
        self.transition_data = Some(data.to_string());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.text()
    }

    /// Whether a record in this lane may be moved to `target`.
    pub fn allows_move_to(&self, target: i32) -> bool {
        match &self.allowed_transitions {
            None => true,
            Some(transitions) => transitions
                .iter()
                .any(|t| t.source == self.value && t.to == target),
        }
    }
}
