//! The boundary the host drives the board through.
//!
//! Every public operation here catches its own failure, records it as a
//! [`BoardAlert`] and clears the work indicator before handing the error back.

use crate::board_assembler::{BoardAssembler, BoardSession, EntityBinding, LoadRequest};
use crate::board_filter::{BoardFilters, DisplayMode, apply_filters, visible_lanes};
use crate::board_store::{BoardAction, BoardAlert, BoardState, BoardStore, DisplayType, Selection};
use crate::customization::CustomizationLoader;
use crate::data_client::DataClient;
use crate::form_host::{FormHost, RecordFormOptions};
use crate::lane_partitioner::drop_targets;
use crate::move_reconciler::{MoveOutcome, MoveReconciler};
use crate::notification_tracker::NotificationTracker;
use crate::transition_hook::{BoardRefresher, HookRegistry, WorkIndicator};
use crate::{BoardError, BoardResult};

use pk_core::{
    BoardConfigSummary, BoardLane, DragMove, EntityReference, Notification, Record, normalize_id,
    record_id,
};

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use tokio::sync::RwLock;

/// A record with the notifications raised on it, and the changed fields' current values.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDetails {
    pub record: Record,
    pub notifications: Vec<Notification>,
    /// Changed fields worth showing, in first-seen order.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum SelectionKind {
    View,
    Form,
    SecondaryView,
    SecondaryForm,
}

pub struct BoardController {
    client: Arc<dyn DataClient>,
    form_host: Arc<dyn FormHost>,
    assembler: BoardAssembler,
    store: Arc<BoardStore>,
    session: RwLock<Option<Arc<BoardSession>>>,
}

impl BoardController {
    pub fn new(
        client: Arc<dyn DataClient>,
        form_host: Arc<dyn FormHost>,
        customization: Arc<dyn CustomizationLoader>,
        hooks: HookRegistry,
    ) -> Self {
        Self {
            assembler: BoardAssembler::new(client.clone(), customization, hooks),
            client,
            form_host,
            store: Arc::new(BoardStore::new()),
            session: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<BoardStore> {
        &self.store
    }

    pub async fn state(&self) -> BoardState {
        self.store.state().await
    }

    pub async fn session(&self) -> Option<Arc<BoardSession>> {
        self.session.read().await.clone()
    }

    pub async fn load(&self, request: &LoadRequest) -> BoardResult<()> {
        let result = self.open_board(request).await;
        self.report("Board load", result).await
    }

    /// Re-fetch with the current selection.
    pub async fn refresh(&self) -> BoardResult<()> {
        let result = self.reload().await;
        self.report("Refresh", result).await
    }

    pub async fn select_view(&self, view_id: &str) -> BoardResult<()> {
        let result = self.select(SelectionKind::View, view_id).await;
        self.report("Selecting view", result).await
    }

    pub async fn select_form(&self, form_id: &str) -> BoardResult<()> {
        let result = self.select(SelectionKind::Form, form_id).await;
        self.report("Selecting card form", result).await
    }

    pub async fn select_secondary_view(&self, view_id: &str) -> BoardResult<()> {
        let result = self.select(SelectionKind::SecondaryView, view_id).await;
        self.report("Selecting secondary view", result).await
    }

    pub async fn select_secondary_form(&self, form_id: &str) -> BoardResult<()> {
        let result = self.select(SelectionKind::SecondaryForm, form_id).await;
        self.report("Selecting secondary card form", result).await
    }

    /// Move a card on the board to the lane of option `target`.
    pub async fn move_record(&self, id: &str, target: i32) -> BoardResult<MoveOutcome> {
        let result = self.run_move(id, target).await;
        self.report("Moving record", result).await
    }

    /// Lanes the card `id` may be dropped on.
    pub async fn drop_targets(&self, id: &str) -> BoardResult<Vec<i32>> {
        let session = self.current_session().await?;
        let (binding, source, _) = self.store.read(|s| locate(&session, s, id)).await?;
        Ok(drop_targets(&binding.schema, source))
    }

    pub async fn subscribe(&self, id: &str) -> BoardResult<()> {
        let result = self.change_subscription(id, true).await;
        self.report("Subscribe", result).await
    }

    pub async fn unsubscribe(&self, id: &str) -> BoardResult<()> {
        let result = self.change_subscription(id, false).await;
        self.report("Unsubscribe", result).await
    }

    /// Delete every notification raised by changes to the record `id`.
    pub async fn clear_notifications(&self, id: &str) -> BoardResult<()> {
        let result = self.clear_for(id).await;
        self.report("Clearing notifications", result).await
    }

    pub async fn select_record(&self, reference: EntityReference, display_type: DisplayType) {
        self.store
            .dispatch(BoardAction::SetSelectedRecord(Some(reference)))
            .await;
        self.store
            .dispatch(BoardAction::SetDisplayType(display_type))
            .await;
    }

    pub async fn close_selection(&self) {
        self.store.dispatch(BoardAction::SetSelectedRecord(None)).await;
    }

    /// Clear the selected record's notifications, then close the side panel.
    pub async fn mark_read_and_close(&self) -> BoardResult<()> {
        let Some(selected) = self.store.read(|s| s.selected_record.clone()).await else {
            return Ok(());
        };

        let result = self.clear_for(&selected.id).await;
        let result = self.report("Marking notifications read", result).await;
        self.close_selection().await;
        result
    }

    /// The record behind a card's notification badge.
    pub async fn notification_details(&self, id: &str) -> BoardResult<NotificationDetails> {
        let result = self.load_notification_details(id).await;
        self.report("Loading notification details", result).await
    }

    /// Open the quick-create form for the primary entity. Refreshes only when a record was saved.
    pub async fn create_record(&self) -> BoardResult<Option<EntityReference>> {
        let result = self
            .open_form(
                None,
                RecordFormOptions {
                    use_quick_create_form: true,
                    open_in_new_window: false,
                },
            )
            .await;
        self.report("Creating record", result).await
    }

    /// Open the record editor for a card.
    pub async fn open_record(&self, id: &str) -> BoardResult<Option<EntityReference>> {
        let result = self
            .open_form(
                Some(id),
                RecordFormOptions {
                    use_quick_create_form: false,
                    open_in_new_window: true,
                },
            )
            .await;
        self.report("Opening record", result).await
    }

    pub async fn list_board_configurations(&self) -> BoardResult<Vec<BoardConfigSummary>> {
        let result = self.client.list_board_configurations().await;
        self.report("Listing boards", result).await
    }

    /// Make `config_id` the board the current user opens by default.
    pub async fn set_default_board(&self, config_id: &str) -> BoardResult<()> {
        let result = self.store_default_board(config_id).await;
        self.report("Setting default board", result).await
    }

    pub async fn set_filters(&self, filters: BoardFilters) {
        self.store.dispatch(BoardAction::SetFilters(filters)).await;
    }

    pub async fn toggle_state_filter(&self, state: i32) {
        self.store
            .dispatch(BoardAction::ToggleStateFilter(state))
            .await;
    }

    pub async fn set_search(&self, search: Option<String>) {
        self.store.dispatch(BoardAction::SetSearch(search)).await;
    }

    pub async fn set_display_mode(&self, mode: DisplayMode) {
        self.store.dispatch(BoardAction::SetDisplayMode(mode)).await;
    }

    pub async fn dismiss_alert(&self) {
        self.store.dispatch(BoardAction::DismissAlert).await;
    }

    /// Primary lanes as currently filtered and laid out.
    pub async fn visible_lanes(&self) -> BoardResult<Vec<BoardLane>> {
        let session = self.current_session().await?;
        let id_attribute = session.primary.id_attribute();
        Ok(self
            .store
            .read(|s| visible_lanes(&s.snapshot, &s.filters, s.display_mode, id_attribute))
            .await)
    }

    /// Filtered secondary lanes of one primary record.
    pub async fn secondary_lanes(&self, parent_id: &str) -> Vec<BoardLane> {
        self.store
            .read(|s| apply_filters(&s.snapshot.secondary_for_parent(parent_id), &s.filters))
            .await
    }

    async fn open_board(&self, request: &LoadRequest) -> BoardResult<()> {
        self.store.dispatch(BoardAction::DismissAlert).await;

        let ticket = self.store.issue_ticket();
        let loaded = self.assembler.load(request, self.store.as_ref()).await?;

        let Selection {
            primary_view,
            primary_form,
            secondary_view,
            secondary_form,
        } = loaded.selection;
        let selections = [
            primary_view.map(BoardAction::SelectView),
            primary_form.map(BoardAction::SelectForm),
            secondary_view.map(BoardAction::SelectSecondaryView),
            secondary_form.map(BoardAction::SelectSecondaryForm),
        ];
        for action in selections.into_iter().flatten() {
            self.store.dispatch(action).await;
        }

        if loaded.board.orphaned > 0 {
            warn!("{} record(s) matched no lane", loaded.board.orphaned);
        }
        self.store
            .dispatch(BoardAction::PublishBoard {
                ticket,
                board: loaded.board,
            })
            .await;
        *self.session.write().await = Some(loaded.session);
        self.store.dispatch(BoardAction::SetProgressText(None)).await;

        Ok(())
    }

    async fn reload(&self) -> BoardResult<()> {
        let session = self.current_session().await?;
        self.fetch_and_publish(&session).await
    }

    async fn fetch_and_publish(&self, session: &BoardSession) -> BoardResult<()> {
        let ticket = self.store.issue_ticket();
        let selection = self.store.read(|s| s.selection.clone()).await;
        let board = self.assembler.fetch(session, &selection).await?;

        if board.orphaned > 0 {
            warn!("{} record(s) matched no lane", board.orphaned);
        }
        self.store
            .dispatch(BoardAction::PublishBoard { ticket, board })
            .await;
        Ok(())
    }

    async fn select(&self, kind: SelectionKind, id: &str) -> BoardResult<()> {
        let session = self.current_session().await?;
        let action = match kind {
            SelectionKind::View => {
                BoardAction::SelectView(found(session.primary.view(id), "view", id)?)
            }
            SelectionKind::Form => {
                BoardAction::SelectForm(found(session.primary.form(id), "card form", id)?)
            }
            SelectionKind::SecondaryView => BoardAction::SelectSecondaryView(found(
                secondary_of(&session)?.view(id),
                "secondary view",
                id,
            )?),
            SelectionKind::SecondaryForm => BoardAction::SelectSecondaryForm(found(
                secondary_of(&session)?.form(id),
                "secondary card form",
                id,
            )?),
        };

        self.store.dispatch(action).await;
        self.fetch_and_publish(&session).await
    }

    async fn run_move(&self, id: &str, target: i32) -> BoardResult<MoveOutcome> {
        let session = self.current_session().await?;
        let (binding, source, record) = self.store.read(|s| locate(&session, s, id)).await?;

        let drag = DragMove::new(&normalize_id(id), record, source).dropped_on(target);
        let reconciler = match &session.hook {
            Some((name, hook)) => MoveReconciler::new(self.client.clone(), self.form_host.clone())
                .with_hook(name, hook.clone()),
            None => MoveReconciler::new(self.client.clone(), self.form_host.clone()),
        };

        let refresher = SessionRefresher { controller: self };
        reconciler
            .reconcile(&binding.schema, &drag, &refresher, self.store.as_ref())
            .await
    }

    async fn change_subscription(&self, id: &str, subscribe: bool) -> BoardResult<()> {
        let session = self.current_session().await?;
        let (binding, _, _) = self.store.read(|s| locate(&session, s, id)).await?;
        let reference = EntityReference::new(binding.logical_name(), &normalize_id(id));
        let tracker = NotificationTracker::new(self.client.clone());

        self.store.set_work_indicator(true).await;
        let index = if subscribe {
            tracker
                .subscribe(&session.config, &reference, binding.metadata.set_name())
                .await?
        } else {
            tracker.unsubscribe(&session.config, &reference).await?
        };
        self.store
            .dispatch(BoardAction::SetSubscriptions(index))
            .await;
        self.store.set_work_indicator(false).await;

        Ok(())
    }

    async fn clear_for(&self, id: &str) -> BoardResult<()> {
        let session = self.current_session().await?;
        let tracker = NotificationTracker::new(self.client.clone());

        self.store.set_work_indicator(true).await;
        let index = tracker.clear_for_record(&session.config, id).await?;
        self.store
            .dispatch(BoardAction::SetNotifications(index))
            .await;
        self.store.set_work_indicator(false).await;

        Ok(())
    }

    async fn load_notification_details(&self, id: &str) -> BoardResult<NotificationDetails> {
        let session = self.current_session().await?;
        let key = normalize_id(id);
        let notifications = self
            .store
            .read(|s| s.notifications.get(&key).cloned().unwrap_or_default())
            .await;

        let Some(first) = notifications.first() else {
            return Err(BoardError::not_found(format!("record {id} has no notifications")));
        };
        let entity = first.parsed.event_record_reference.logical_name.clone();
        let id_attribute = session
            .binding(&entity)
            .map(EntityBinding::id_attribute)
            .unwrap_or_default();

        let mut fields: Vec<String> = Vec::new();
        for field in notifications
            .iter()
            .flat_map(|n| n.displayed_fields(id_attribute))
        {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }

        let record = self.client.retrieve_record(&entity, &key, &fields).await?;
        Ok(NotificationDetails {
            record,
            notifications,
            fields,
        })
    }

    async fn open_form(
        &self,
        id: Option<&str>,
        options: RecordFormOptions,
    ) -> BoardResult<Option<EntityReference>> {
        let session = self.current_session().await?;
        let entity = match id {
            Some(id) => {
                let (binding, _, _) = self.store.read(|s| locate(&session, s, id)).await?;
                binding.logical_name().to_string()
            }
            None => session.primary.logical_name().to_string(),
        };

        let saved = self
            .form_host
            .open_record_form(&entity, id, &options)
            .await?;
        match &saved {
            Some(reference) => {
                info!("{} {} was saved", reference.logical_name, reference.id);
                self.fetch_and_publish(&session).await?;
            }
            None => info!("Record form for {entity} closed without saving"),
        }

        Ok(saved)
    }

    async fn store_default_board(&self, config_id: &str) -> BoardResult<()> {
        let user_id = self.client.current_user_id().await?;
        self.client.set_default_board_id(&user_id, config_id).await?;
        info!("Board {config_id} is now the default of user {user_id}");
        Ok(())
    }

    async fn current_session(&self) -> BoardResult<Arc<BoardSession>> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| BoardError::configuration("no board is loaded"))
    }

    async fn report<T>(&self, operation: &str, result: BoardResult<T>) -> BoardResult<T> {
        if let Err(e) = &result {
            error!("{operation} failed: {e}");
            self.store
                .dispatch(BoardAction::SetWorkIndicator(false))
                .await;
            self.store.dispatch(BoardAction::SetProgressText(None)).await;
            self.store
                .dispatch(BoardAction::RaiseAlert(BoardAlert {
                    severity: e.severity(),
                    message: e.to_string(),
                }))
                .await;
        }
        result
    }
}

/// What a move or a hook refreshes through. Failures raise their own alert.
struct SessionRefresher<'a> {
    controller: &'a BoardController,
}

#[async_trait]
impl BoardRefresher for SessionRefresher<'_> {
    async fn refresh(&self) -> BoardResult<()> {
        let result = self.controller.reload().await;
        self.controller.report("Refresh", result).await
    }
}

/// Find a card on the published board: its binding, lane value and record.
fn locate<'s>(
    session: &'s BoardSession,
    state: &BoardState,
    id: &str,
) -> BoardResult<(&'s EntityBinding, Option<i32>, Record)> {
    if let Some((lane, record)) = state
        .snapshot
        .find_record(id, session.primary.id_attribute())
    {
        return Ok((&session.primary, lane.value(), record.clone()));
    }

    if let (Some(binding), Some(secondary)) = (&session.secondary, &state.snapshot.secondary) {
        let key = normalize_id(id);
        let id_attribute = binding.entity.id_attribute();
        for lane in &secondary.lanes {
            if let Some(record) = lane
                .data
                .iter()
                .find(|r| record_id(r, id_attribute).as_deref() == Some(key.as_str()))
            {
                return Ok((&binding.entity, lane.value(), record.clone()));
            }
        }
    }

    Err(BoardError::not_found(format!("record {id} is not on the board")))
}

fn secondary_of(session: &BoardSession) -> BoardResult<&EntityBinding> {
    session
        .secondary
        .as_ref()
        .map(|s| &s.entity)
        .ok_or_else(|| BoardError::configuration("the board has no secondary entity"))
}

fn found<T: Clone>(item: Option<&T>, what: &str, id: &str) -> BoardResult<T> {
    item.cloned()
        .ok_or_else(|| BoardError::not_found(format!("{what} {id} does not exist")))
}
