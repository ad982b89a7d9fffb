use crate::models::record::Record;

use serde::{Deserialize, Serialize};

/// A drag gesture handed from the view layer to the move reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragMove {
    pub record_id: String,
    pub record: Record,
    /// Option value of the lane the card was picked up from (`None` = unmatched lane).
    pub source: Option<i32>,
    /// Option value of the lane the card was dropped on (`None` = no drop target).
    pub target: Option<i32>,
}

impl DragMove {
    pub fn new(record_id: &str, record: Record, source: Option<i32>) -> Self {
        Self {
            record_id: record_id.to_string(),
            record,
            source,
            target: None,
        }
    }

    pub fn dropped_on(mut self, target: i32) -> Self {
        self.target = Some(target);
        self
    }
}
