use crate::models::board_lane::BoardLane;
use crate::models::record::{Record, lookup_value, normalize_id, record_id};

use serde::{Deserialize, Serialize};

/// Secondary records partitioned into their own lanes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondaryLanes {
    /// Lookup on each secondary record holding its primary record's id.
    pub parent_lookup: String,
    pub lanes: Vec<BoardLane>,
}

/// Everything one fetch produced. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    pub primary: Vec<BoardLane>,
    pub secondary: Option<SecondaryLanes>,
}

impl BoardSnapshot {
    pub fn record_count(&self) -> usize {
        self.primary.iter().map(BoardLane::len).sum()
    }

    /// Ids of every primary record, in lane order.
    pub fn record_ids(&self, primary_id_attribute: &str) -> Vec<String> {
        self.primary
            .iter()
            .flat_map(|lane| lane.data.iter())
            .filter_map(|record| record_id(record, primary_id_attribute))
            .collect()
    }

    pub fn find_record(
        &self,
        id: &str,
        primary_id_attribute: &str,
    ) -> Option<(&BoardLane, &Record)> {
        let id = normalize_id(id);
        self.primary.iter().find_map(|lane| {
            lane.data
                .iter()
                .find(|r| record_id(r, primary_id_attribute).as_deref() == Some(id.as_str()))
                .map(|r| (lane, r))
        })
    }

    /// Secondary lanes restricted to the children of one primary record.
    pub fn secondary_for_parent(&self, parent_id: &str) -> Vec<BoardLane> {
        let Some(secondary) = &self.secondary else {
            return Vec::new();
        };
        let parent_id = normalize_id(parent_id);

        secondary
            .lanes
            .iter()
            .map(|lane| BoardLane {
                option: lane.option.clone(),
                data: lane
                    .data
                    .iter()
                    .filter(|r| {
                        lookup_value(r, &secondary.parent_lookup).as_deref()
                            == Some(parent_id.as_str())
                    })
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
