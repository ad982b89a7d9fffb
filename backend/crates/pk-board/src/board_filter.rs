use pk_core::{BoardLane, BoardSnapshot, field_text, record_id};

use serde::{Deserialize, Serialize};

/// User-chosen narrowing of the published board. Never changes what was fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardFilters {
    /// Option `State` values to show. Empty shows every lane.
    pub states: Vec<i32>,
    pub search: Option<String>,
}

impl BoardFilters {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.search.as_deref().is_none_or(|s| s.trim().is_empty())
    }

    pub fn toggle_state(&mut self, state: i32) {
        if let Some(at) = self.states.iter().position(|s| *s == state) {
            self.states.remove(at);
        } else {
            self.states.push(state);
        }
    }
}

/// How primary records with secondary children are laid out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisplayMode {
    /// Every primary record in its lane.
    #[default]
    Simple,
    /// Records with secondary children are shown in their own rows and left out of the lanes.
    Secondary,
}

/// Apply state and search filters to a set of lanes.
pub fn apply_filters(lanes: &[BoardLane], filters: &BoardFilters) -> Vec<BoardLane> {
    let search = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    lanes
        .iter()
        .filter(|lane| {
            filters.states.is_empty()
                || lane
                    .option
                    .as_ref()
                    .is_some_and(|o| filters.states.contains(&o.state))
        })
        .map(|lane| match &search {
            None => lane.clone(),
            Some(needle) => BoardLane {
                option: lane.option.clone(),
                data: lane
                    .data
                    .iter()
                    .filter(|record| {
                        record
                            .values()
                            .any(|v| field_text(v).to_lowercase().contains(needle.as_str()))
                    })
                    .cloned()
                    .collect(),
            },
        })
        .collect()
}

/// Ids of primary records that have at least one secondary record.
pub fn parents_with_children(snapshot: &BoardSnapshot, primary_id_attribute: &str) -> Vec<String> {
    snapshot
        .record_ids(primary_id_attribute)
        .into_iter()
        .filter(|id| {
            snapshot
                .secondary_for_parent(id)
                .iter()
                .any(|lane| !lane.is_empty())
        })
        .collect()
}

/// The primary lanes as shown in `mode`, after filtering.
pub fn visible_lanes(
    snapshot: &BoardSnapshot,
    filters: &BoardFilters,
    mode: DisplayMode,
    primary_id_attribute: &str,
) -> Vec<BoardLane> {
    let filtered = apply_filters(&snapshot.primary, filters);
    if mode == DisplayMode::Simple || snapshot.secondary.is_none() {
        return filtered;
    }

    let parents = parents_with_children(snapshot, primary_id_attribute);
    filtered
        .into_iter()
        .map(|lane| BoardLane {
            option: lane.option,
            data: lane
                .data
                .into_iter()
                .filter(|r| {
                    record_id(r, primary_id_attribute).is_none_or(|id| !parents.contains(&id))
                })
                .collect(),
        })
        .collect()
}
