//! Loads a board session and fetches its data.

use crate::board_store::Selection;
use crate::customization::CustomizationLoader;
use crate::data_client::DataClient;
use crate::lane_partitioner::{PartitionOptions, partition};
use crate::metadata_resolver::MetadataResolver;
use crate::notification_tracker::{NotificationIndex, NotificationTracker, SubscriptionIndex};
use crate::query_translator::{QueryPlan, scope_to, translate};
use crate::transition_hook::{HookRegistry, TransitionHook};
use crate::{BoardError, BoardResult};

use pk_core::{
    AttributeSchema, BoardConfig, BoardLane, BoardSnapshot, CardForm, EntityConfig,
    EntityMetadata, NOTIFICATION_ENTITY, SavedView, SecondaryLanes,
};

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

/// Told which load step is running.
#[async_trait]
pub trait LoadProgress: Send + Sync {
    async fn step(&self, text: &str);
}

/// One configured entity with everything resolved for it.
#[derive(Debug, Clone)]
pub struct EntityBinding {
    pub config: EntityConfig,
    pub metadata: EntityMetadata,
    pub schema: AttributeSchema,
    pub views: Vec<SavedView>,
    /// Card forms, parsed.
    pub forms: Vec<CardForm>,
}

impl EntityBinding {
    pub fn logical_name(&self) -> &str {
        &self.metadata.logical_name
    }

    pub fn id_attribute(&self) -> &str {
        &self.metadata.primary_id_attribute
    }

    pub fn view(&self, id: &str) -> Option<&SavedView> {
        self.views.iter().find(|v| v.id.eq_ignore_ascii_case(id))
    }

    pub fn form(&self, id: &str) -> Option<&CardForm> {
        self.forms.iter().find(|f| f.id.eq_ignore_ascii_case(id))
    }
}

#[derive(Debug, Clone)]
pub struct SecondaryBinding {
    pub entity: EntityBinding,
    pub parent_lookup: String,
}

#[derive(Debug, Clone)]
pub struct NotificationBinding {
    pub metadata: EntityMetadata,
    pub form: Option<CardForm>,
}

/// Everything a board needs that does not change until it is reopened.
pub struct BoardSession {
    pub config_id: String,
    pub config: BoardConfig,
    pub user_id: String,
    pub primary: EntityBinding,
    /// Active/inactive grouping used by the state filter.
    pub state_schema: Option<AttributeSchema>,
    pub secondary: Option<SecondaryBinding>,
    pub notification: NotificationBinding,
    pub hook: Option<(String, Arc<dyn TransitionHook>)>,
    pub hide_empty_lanes: bool,
}

impl BoardSession {
    /// The binding for records of `entity`.
    pub fn binding(&self, entity: &str) -> Option<&EntityBinding> {
        if self.primary.logical_name() == entity {
            return Some(&self.primary);
        }
        self.secondary
            .as_ref()
            .map(|s| &s.entity)
            .filter(|e| e.logical_name() == entity)
    }

    fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            hide_empty_lanes: self.hide_empty_lanes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    /// Board to open. Falls back to the user's default board.
    pub config_id: Option<String>,
    /// Also hide empty lanes when the board configuration does not ask for it.
    pub hide_empty_lanes: bool,
    /// Views and card forms to open with instead of the defaults.
    pub selection: SelectionRequest,
}

/// Ids of the views and card forms a board opens with. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    pub view: Option<String>,
    pub form: Option<String>,
    pub secondary_view: Option<String>,
    pub secondary_form: Option<String>,
}

/// One fetch's worth of board data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBoard {
    pub snapshot: BoardSnapshot,
    pub subscriptions: SubscriptionIndex,
    pub notifications: NotificationIndex,
    pub orphaned: usize,
}

pub struct LoadedBoard {
    pub session: Arc<BoardSession>,
    pub selection: Selection,
    pub board: FetchedBoard,
}

#[derive(Clone)]
pub struct BoardAssembler {
    client: Arc<dyn DataClient>,
    customization: Arc<dyn CustomizationLoader>,
    hooks: HookRegistry,
}

impl BoardAssembler {
    pub fn new(
        client: Arc<dyn DataClient>,
        customization: Arc<dyn CustomizationLoader>,
        hooks: HookRegistry,
    ) -> Self {
        Self {
            client,
            customization,
            hooks,
        }
    }

    /// Open a board.
    ///
    /// Steps run strictly in order and the first failure aborts the load.
    pub async fn load(
        &self,
        request: &LoadRequest,
        progress: &dyn LoadProgress,
    ) -> BoardResult<LoadedBoard> {
        let resolver = MetadataResolver::new(self.client.clone());

        progress.step("Resolving board configuration").await;
        let user_id = self.client.current_user_id().await?;
        let config_id = self.resolve_config_id(request, &user_id).await?;
        let blob = self.client.retrieve_board_configuration(&config_id).await?;
        let config = BoardConfig::from_encoded(&blob)?;

        if let Some(url) = config.custom_script_url.as_deref() {
            progress.step("Loading customizations").await;
            self.customization.load(url).await.map_err(|e| match e {
                BoardError::Customization { .. } => e,
                other => BoardError::customization(url, other.to_string()),
            })?;
        }
        let hook = self
            .hooks
            .resolve(config.transition_callback.as_deref())?
            .zip(config.transition_callback.clone())
            .map(|(hook, name)| (name, hook));

        progress.step("Fetching metadata").await;
        let (primary_metadata, primary_schema) = resolver
            .resolve(
                &config.primary_entity.logical_name,
                &config.primary_entity.swim_lane_source,
            )
            .await?;
        let state_schema = resolver.state_schema(&primary_metadata).await?;

        let secondary = match &config.secondary_entity {
            Some(secondary) => {
                progress.step("Fetching secondary metadata").await;
                let (metadata, schema) = resolver
                    .resolve(
                        &secondary.entity.logical_name,
                        &secondary.entity.swim_lane_source,
                    )
                    .await?;
                Some((secondary.clone(), metadata, schema))
            }
            None => None,
        };
        let notification_metadata = resolver.entity_metadata(NOTIFICATION_ENTITY).await?;

        progress.step("Fetching views and card forms").await;
        let primary = self
            .bind(config.primary_entity.clone(), primary_metadata, primary_schema)
            .await?;
        let secondary = match secondary {
            Some((secondary, metadata, schema)) => Some(SecondaryBinding {
                entity: self.bind(secondary.entity, metadata, schema).await?,
                parent_lookup: secondary.parent_lookup,
            }),
            None => None,
        };
        let notification_form = self
            .client
            .retrieve_card_forms(NOTIFICATION_ENTITY)
            .await?
            .into_iter()
            .next()
            .map(CardForm::parse)
            .transpose()?;

        let requested = &request.selection;
        let selection = Selection {
            primary_view: Some(match requested.view.as_deref() {
                Some(id) => chosen(primary.view(id), "view", id)?,
                None => default_view(&primary, config.default_view_id.as_deref())?,
            }),
            primary_form: Some(match requested.form.as_deref() {
                Some(id) => chosen(primary.form(id), "card form", id)?,
                None => default_form(&primary)?,
            }),
            secondary_view: match (&secondary, requested.secondary_view.as_deref()) {
                (Some(s), Some(id)) => Some(chosen(s.entity.view(id), "secondary view", id)?),
                (Some(s), None) => Some(default_view(&s.entity, None)?),
                (None, Some(_)) => return Err(no_secondary_entity()),
                (None, None) => None,
            },
            secondary_form: match (&secondary, requested.secondary_form.as_deref()) {
                (Some(s), Some(id)) => Some(chosen(s.entity.form(id), "secondary card form", id)?),
                (Some(s), None) => Some(default_form(&s.entity)?),
                (None, Some(_)) => return Err(no_secondary_entity()),
                (None, None) => None,
            },
        };

        let session = Arc::new(BoardSession {
            config_id,
            hide_empty_lanes: request.hide_empty_lanes || config.hide_empty_lanes,
            config,
            user_id,
            primary,
            state_schema,
            secondary,
            notification: NotificationBinding {
                metadata: notification_metadata,
                form: notification_form,
            },
            hook,
        });

        progress.step("Fetching board data").await;
        let board = self.fetch(&session, &selection).await?;

        info!(
            "Loaded board {} with {} record(s) in {} lane(s)",
            session.config_id,
            board.snapshot.record_count(),
            board.snapshot.primary.len()
        );

        Ok(LoadedBoard {
            session,
            selection,
            board,
        })
    }

    /// Fetch subscriptions, notifications and lane data for the current selection.
    pub async fn fetch(
        &self,
        session: &BoardSession,
        selection: &Selection,
    ) -> BoardResult<FetchedBoard> {
        let tracker = NotificationTracker::new(self.client.clone());

        let (subscriptions, notifications, (primary, primary_orphans)) = futures::try_join!(
            tracker.fetch_subscriptions(&session.config),
            tracker.fetch_notifications(&session.config),
            self.fetch_primary(session, selection),
        )?;

        let (secondary, secondary_orphans) = match &session.secondary {
            Some(binding) => {
                let parent_ids = BoardSnapshot {
                    primary: primary.clone(),
                    secondary: None,
                }
                .record_ids(session.primary.id_attribute());
                let (lanes, orphans) = self
                    .fetch_secondary(session, binding, selection, &parent_ids)
                    .await?;
                (
                    Some(SecondaryLanes {
                        parent_lookup: binding.parent_lookup.clone(),
                        lanes,
                    }),
                    orphans,
                )
            }
            None => (None, 0),
        };

        Ok(FetchedBoard {
            snapshot: BoardSnapshot { primary, secondary },
            subscriptions,
            notifications,
            orphaned: primary_orphans + secondary_orphans,
        })
    }

    async fn fetch_primary(
        &self,
        session: &BoardSession,
        selection: &Selection,
    ) -> BoardResult<(Vec<BoardLane>, usize)> {
        let binding = &session.primary;
        let view = selected(selection.primary_view.as_ref(), binding, "view")?;
        let form = selected(selection.primary_form.as_ref(), binding, "card form")?;

        let base = view.definition()?.query;
        let plan = QueryPlan::new(
            binding.id_attribute(),
            &form.parsed.fields(),
            &binding.schema.logical_name,
        );
        let records = self.client.retrieve_multiple(&translate(&base, &plan)).await?;
        debug!(
            "Fetched {} {} record(s) through view {}",
            records.len(),
            binding.logical_name(),
            view.name
        );

        let partition = partition(records, &binding.schema, session.partition_options());
        Ok((partition.lanes, partition.orphaned))
    }

    async fn fetch_secondary(
        &self,
        session: &BoardSession,
        binding: &SecondaryBinding,
        selection: &Selection,
        parent_ids: &[String],
    ) -> BoardResult<(Vec<BoardLane>, usize)> {
        let entity = &binding.entity;
        let view = selected(selection.secondary_view.as_ref(), entity, "view")?;
        let form = selected(selection.secondary_form.as_ref(), entity, "card form")?;

        let base = view.definition()?.query;
        let plan = QueryPlan::new(
            entity.id_attribute(),
            &form.parsed.fields(),
            &entity.schema.logical_name,
        )
        .with_extra_field(&binding.parent_lookup)
        .with_condition(scope_to(&binding.parent_lookup, parent_ids));

        let records = self.client.retrieve_multiple(&translate(&base, &plan)).await?;
        debug!(
            "Fetched {} {} record(s) for {} parent(s)",
            records.len(),
            entity.logical_name(),
            parent_ids.len()
        );

        let partition = partition(records, &entity.schema, session.partition_options());
        Ok((partition.lanes, partition.orphaned))
    }

    async fn resolve_config_id(&self, request: &LoadRequest, user_id: &str) -> BoardResult<String> {
        if let Some(id) = request.config_id.as_deref().filter(|id| !id.trim().is_empty()) {
            return Ok(id.trim().to_string());
        }

        self.client
            .retrieve_default_board_id(user_id)
            .await?
            .ok_or_else(|| {
                BoardError::configuration(
                    "no board configuration given and the user has no default board",
                )
            })
    }

    async fn bind(
        &self,
        config: EntityConfig,
        metadata: EntityMetadata,
        schema: AttributeSchema,
    ) -> BoardResult<EntityBinding> {
        let views = self.client.retrieve_saved_views(&metadata.logical_name).await?;
        let forms = self
            .client
            .retrieve_card_forms(&metadata.logical_name)
            .await?
            .into_iter()
            .map(CardForm::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EntityBinding {
            config,
            metadata,
            schema,
            views,
            forms,
        })
    }
}

#[track_caller]
fn default_view(binding: &EntityBinding, preferred: Option<&str>) -> BoardResult<SavedView> {
    preferred
        .and_then(|id| binding.view(id))
        .or_else(|| binding.views.first())
        .cloned()
        .ok_or_else(|| {
            BoardError::configuration(format!("{} has no saved view", binding.logical_name()))
        })
}

#[track_caller]
fn default_form(binding: &EntityBinding) -> BoardResult<CardForm> {
    binding.forms.first().cloned().ok_or_else(|| {
        BoardError::configuration(format!("{} has no card form", binding.logical_name()))
    })
}

#[track_caller]
fn chosen<T: Clone>(item: Option<&T>, what: &str, id: &str) -> BoardResult<T> {
    item.cloned()
        .ok_or_else(|| BoardError::not_found(format!("{what} {id} does not exist")))
}

#[track_caller]
fn no_secondary_entity() -> BoardError {
    BoardError::configuration("the board has no secondary entity")
}

#[track_caller]
fn selected<'a, T>(
    selection: Option<&'a T>,
    binding: &EntityBinding,
    what: &str,
) -> BoardResult<&'a T> {
    selection.ok_or_else(|| {
        BoardError::configuration(format!("no {what} selected for {}", binding.logical_name()))
    })
}
