//! The board's application state and the reducer that is its only writer.

use crate::board_assembler::{FetchedBoard, LoadProgress};
use crate::board_filter::{BoardFilters, DisplayMode};
use crate::error::Severity;
use crate::notification_tracker::{NotificationIndex, SubscriptionIndex};
use crate::transition_hook::WorkIndicator;

use pk_core::{BoardSnapshot, CardForm, EntityReference, SavedView, ViewDefinition};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Layout cache key of the secondary ("advanced") grid.
pub const ADVANCED_CACHE_KEY: &str = "advanced";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardAlert {
    pub severity: Severity,
    pub message: String,
}

/// What the side panel shows for the selected record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisplayType {
    #[default]
    RecordForm,
    Notifications,
}

/// Measured row heights of one lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutCache {
    pub row_heights: BTreeMap<String, u32>,
}

/// One cache per lane, keyed `primary-<value>` / `secondary-<value>`, plus `advanced`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutCaches {
    pub caches: BTreeMap<String, LayoutCache>,
    pub resets: u64,
}

impl LayoutCaches {
    pub fn for_snapshot(snapshot: &BoardSnapshot) -> Self {
        let primary = snapshot
            .primary
            .iter()
            .filter_map(|lane| lane.value())
            .map(|v| format!("primary-{v}"));
        let secondary = snapshot
            .secondary
            .iter()
            .flat_map(|s| s.lanes.iter())
            .filter_map(|lane| lane.value())
            .map(|v| format!("secondary-{v}"));

        let caches = std::iter::once(ADVANCED_CACHE_KEY.to_string())
            .chain(primary)
            .chain(secondary)
            .map(|key| (key, LayoutCache::default()))
            .collect();

        Self { caches, resets: 0 }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.caches.keys().map(String::as_str).collect()
    }

    /// Forget every measurement. Safe to call repeatedly.
    pub fn reset(&mut self) {
        for cache in self.caches.values_mut() {
            cache.row_heights.clear();
        }
        self.resets += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub primary_view: Option<SavedView>,
    pub primary_form: Option<CardForm>,
    pub secondary_view: Option<SavedView>,
    pub secondary_form: Option<CardForm>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub snapshot: BoardSnapshot,
    /// Ticket of the fetch that produced `snapshot`.
    pub published_ticket: u64,
    pub subscriptions: SubscriptionIndex,
    pub notifications: NotificationIndex,
    pub selection: Selection,
    pub primary_view_data: Option<ViewDefinition>,
    pub secondary_view_data: Option<ViewDefinition>,
    pub selected_record: Option<EntityReference>,
    pub display_type: DisplayType,
    pub display_mode: DisplayMode,
    pub filters: BoardFilters,
    pub work_indicator: bool,
    pub progress_text: Option<String>,
    pub alert: Option<BoardAlert>,
    pub layout: LayoutCaches,
}

#[derive(Debug, Clone)]
pub enum BoardAction {
    PublishBoard { ticket: u64, board: FetchedBoard },
    SetSubscriptions(SubscriptionIndex),
    SetNotifications(NotificationIndex),
    SelectView(SavedView),
    SelectForm(CardForm),
    SelectSecondaryView(SavedView),
    SelectSecondaryForm(CardForm),
    SetSelectedRecord(Option<EntityReference>),
    SetDisplayType(DisplayType),
    SetDisplayMode(DisplayMode),
    SetFilters(BoardFilters),
    ToggleStateFilter(i32),
    SetSearch(Option<String>),
    SetWorkIndicator(bool),
    SetProgressText(Option<String>),
    RaiseAlert(BoardAlert),
    DismissAlert,
    MeasureRow {
        cache: String,
        record_id: String,
        height: u32,
    },
    ResetLayout,
}

/// Apply one action. Pure: the result depends only on the arguments.
pub fn reduce(mut state: BoardState, action: BoardAction) -> BoardState {
    match action {
        BoardAction::PublishBoard { ticket, board } => {
            if ticket <= state.published_ticket {
                debug!(
                    "Discarding board from fetch {ticket}; fetch {} is already published",
                    state.published_ticket
                );
                return state;
            }
            state.layout = LayoutCaches::for_snapshot(&board.snapshot);
            state.snapshot = board.snapshot;
            state.subscriptions = board.subscriptions;
            state.notifications = board.notifications;
            state.published_ticket = ticket;
        }
        BoardAction::SetSubscriptions(index) => state.subscriptions = index,
        BoardAction::SetNotifications(index) => state.notifications = index,
        BoardAction::SelectView(view) => {
            state.primary_view_data = view_data(&view);
            state.selection.primary_view = Some(view);
            state.layout.reset();
        }
        BoardAction::SelectForm(form) => {
            state.selection.primary_form = Some(form);
            state.layout.reset();
        }
        BoardAction::SelectSecondaryView(view) => {
            state.secondary_view_data = view_data(&view);
            state.selection.secondary_view = Some(view);
            state.layout.reset();
        }
        BoardAction::SelectSecondaryForm(form) => {
            state.selection.secondary_form = Some(form);
            state.layout.reset();
        }
        BoardAction::SetSelectedRecord(record) => state.selected_record = record,
        BoardAction::SetDisplayType(display_type) => state.display_type = display_type,
        BoardAction::SetDisplayMode(mode) => {
            state.display_mode = mode;
            state.layout.reset();
        }
        BoardAction::SetFilters(filters) => {
            state.filters = filters;
            state.layout.reset();
        }
        BoardAction::ToggleStateFilter(value) => {
            state.filters.toggle_state(value);
            state.layout.reset();
        }
        BoardAction::SetSearch(search) => {
            state.filters.search = search.filter(|s| !s.trim().is_empty());
            state.layout.reset();
        }
        BoardAction::SetWorkIndicator(busy) => state.work_indicator = busy,
        BoardAction::SetProgressText(text) => state.progress_text = text,
        BoardAction::RaiseAlert(alert) => state.alert = Some(alert),
        BoardAction::DismissAlert => state.alert = None,
        BoardAction::MeasureRow {
            cache,
            record_id,
            height,
        } => match state.layout.caches.get_mut(&cache) {
            Some(layout) => {
                layout.row_heights.insert(record_id, height);
            }
            None => debug!("No layout cache {cache}; measurement dropped"),
        },
        BoardAction::ResetLayout => state.layout.reset(),
    }

    state
}

fn view_data(view: &SavedView) -> Option<ViewDefinition> {
    match view.definition() {
        Ok(definition) => Some(definition),
        Err(e) => {
            warn!("View {} has an unreadable definition: {e}", view.name);
            None
        }
    }
}

/// Shared holder of [`BoardState`]. Every change goes through [`reduce`].
#[derive(Debug, Default)]
pub struct BoardStore {
    state: RwLock<BoardState>,
    tickets: AtomicU64,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn dispatch(&self, action: BoardAction) {
        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action);
    }

    pub async fn state(&self) -> BoardState {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// A ticket for a fetch about to start. Later fetches get larger tickets.
    pub fn issue_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl WorkIndicator for BoardStore {
    async fn set_work_indicator(&self, busy: bool) {
        self.dispatch(BoardAction::SetWorkIndicator(busy)).await;
    }
}

#[async_trait]
impl LoadProgress for BoardStore {
    async fn step(&self, text: &str) {
        debug!("{text}");
        self.dispatch(BoardAction::SetProgressText(Some(text.to_string())))
            .await;
    }
}
