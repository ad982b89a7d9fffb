use crate::models::picklist_option::PicklistOption;
use crate::models::record::Record;

use serde::{Deserialize, Serialize};

/// One column of the board. `option == None` is the lane for records without a value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardLane {
    pub option: Option<PicklistOption>,
    pub data: Vec<Record>,
}

impl BoardLane {
    pub fn new(option: PicklistOption) -> Self {
        Self {
            option: Some(option),
            data: Vec::new(),
        }
    }

    pub fn unmatched() -> Self {
        Self {
            option: None,
            data: Vec::new(),
        }
    }

    pub fn is_unmatched(&self) -> bool {
        self.option.is_none()
    }

    pub fn value(&self) -> Option<i32> {
        self.option.as_ref().map(|o| o.value)
    }

    pub fn label(&self) -> &str {
        self.option.as_ref().map_or("", |o| o.display_label())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
