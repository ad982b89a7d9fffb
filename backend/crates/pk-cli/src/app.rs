//! Command implementations on top of the board controller.

use crate::customization::WebResourceLoader;
use crate::error::{CliError, Result as CliErrorResult};
use crate::form_host::TerminalFormHost;
use crate::hooks::built_in_hooks;
use crate::output::{
    CardDecorations, card_fields, configurations_json, display_value, lanes_json,
};

use pk_board::{
    BoardController, BoardError, DataClient, DisplayMode, DisplayType, LoadRequest, MoveOutcome,
    SelectionRequest, parents_with_children,
};
use pk_config::Config;
use pk_core::{EntityReference, Notification, normalize_id};
use pk_notify::{NotificationProducer, ProducerConfig, RecordEvent};

use std::path::Path;
use std::sync::Arc;

use log::info;
use serde_json::{Map, Value, json};

/// How `board show` narrows and lays out the board.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub view: Option<String>,
    pub form: Option<String>,
    pub secondary_view: Option<String>,
    pub secondary_form: Option<String>,
    pub states: Vec<i32>,
    pub search: Option<String>,
    pub secondary: bool,
}

impl ShowOptions {
    pub(crate) fn load_request(&self, base: &LoadRequest) -> LoadRequest {
        LoadRequest {
            selection: SelectionRequest {
                view: self.view.clone(),
                form: self.form.clone(),
                secondary_view: self.secondary_view.clone(),
                secondary_form: self.secondary_form.clone(),
            },
            ..base.clone()
        }
    }
}

pub struct BoardApp {
    client: Arc<dyn DataClient>,
    controller: BoardController,
    request: LoadRequest,
}

impl BoardApp {
    pub fn new(
        client: Arc<dyn DataClient>,
        config: &Config,
        config_id: Option<String>,
        hide_empty_lanes: bool,
    ) -> Self {
        let org_url = &config.api.base_url;
        let form_host = Arc::new(TerminalFormHost::new(client.clone(), org_url));
        let customization = Arc::new(WebResourceLoader::new(
            org_url,
            config.api.access_token.as_deref(),
        ));

        let controller =
            BoardController::new(client.clone(), form_host, customization, built_in_hooks());
        let request = LoadRequest {
            config_id: config_id.or_else(|| config.board.config_id.clone()),
            hide_empty_lanes: hide_empty_lanes || config.board.hide_empty_lanes,
            ..LoadRequest::default()
        };

        Self {
            client,
            controller,
            request,
        }
    }

    pub fn client(&self) -> Arc<dyn DataClient> {
        self.client.clone()
    }

    async fn open(&self) -> CliErrorResult<()> {
        self.controller.load(&self.request).await?;
        Ok(())
    }

    pub async fn list_configurations(&self) -> CliErrorResult<Value> {
        let configs = self.controller.list_board_configurations().await?;
        let user = self.client.current_user_id().await?;
        let default_id = self.client.retrieve_default_board_id(&user).await?;
        Ok(configurations_json(&configs, default_id.as_deref()))
    }

    pub async fn set_default_board(&self, config_id: &str) -> CliErrorResult<Value> {
        self.controller.set_default_board(config_id).await?;
        Ok(json!({ "default": normalize_id(config_id) }))
    }

    /// Load the board once with the requested views and forms, then narrow it locally.
    pub async fn show(&self, options: &ShowOptions) -> CliErrorResult<Value> {
        self.controller.load(&options.load_request(&self.request)).await?;

        for state in &options.states {
            self.controller.toggle_state_filter(*state).await;
        }
        self.controller.set_search(options.search.clone()).await;
        if options.secondary {
            self.controller.set_display_mode(DisplayMode::Secondary).await;
        }

        self.render().await
    }

    /// The board as currently loaded, filtered and laid out.
    pub async fn render(&self) -> CliErrorResult<Value> {
        let session = self.session().await?;
        let state = self.controller.state().await;
        let lanes = self.controller.visible_lanes().await?;

        let decorations = CardDecorations {
            notifications: &state.notifications,
            subscriptions: &state.subscriptions,
        };
        let primary = &session.primary;
        let fields = card_fields(
            state.selection.primary_form.as_ref(),
            primary.metadata.primary_name_attribute.as_deref(),
        );

        let mut board = Map::new();
        board.insert("configId".into(), json!(session.config_id));
        board.insert("entity".into(), json!(primary.logical_name()));
        board.insert(
            "view".into(),
            json!(state.selection.primary_view.as_ref().map(|v| &v.name)),
        );
        board.insert(
            "form".into(),
            json!(state.selection.primary_form.as_ref().map(|f| &f.name)),
        );
        board.insert(
            "lanes".into(),
            lanes_json(&lanes, primary.id_attribute(), &fields, &decorations),
        );

        if let (DisplayMode::Secondary, Some(secondary)) = (state.display_mode, &session.secondary)
        {
            let child_fields = card_fields(
                state.selection.secondary_form.as_ref(),
                secondary.entity.metadata.primary_name_attribute.as_deref(),
            );
            let mut swimlanes = Vec::new();
            for parent in parents_with_children(&state.snapshot, primary.id_attribute()) {
                let child_lanes = self.controller.secondary_lanes(&parent).await;
                swimlanes.push(json!({
                    "parent": parent,
                    "lanes": lanes_json(
                        &child_lanes,
                        secondary.entity.id_attribute(),
                        &child_fields,
                        &decorations,
                    ),
                }));
            }
            board.insert("swimlanes".into(), Value::Array(swimlanes));
        }

        if let Some(ref alert) = state.alert {
            board.insert(
                "alert".into(),
                json!({ "severity": alert.severity, "message": alert.message }),
            );
        }

        Ok(Value::Object(board))
    }

    pub async fn move_record(&self, id: &str, target: i32) -> CliErrorResult<Value> {
        self.open().await?;
        let outcome = self.controller.move_record(id, target).await?;
        if let MoveOutcome::Ignored(reason) = outcome {
            info!("Move of {id} to {target} ignored: {reason:?}");
        }
        Ok(json!({ "id": normalize_id(id), "target": target, "outcome": outcome }))
    }

    pub async fn drop_targets(&self, id: &str) -> CliErrorResult<Value> {
        self.open().await?;
        let targets = self.controller.drop_targets(id).await?;
        Ok(json!({ "id": normalize_id(id), "targets": targets }))
    }

    pub async fn create_record(&self) -> CliErrorResult<Value> {
        self.open().await?;
        let created = self.controller.create_record().await?;
        Ok(json!({ "created": created.map(|r| r.id) }))
    }

    pub async fn open_record(&self, id: &str) -> CliErrorResult<Value> {
        self.open().await?;
        self.controller.open_record(id).await?;
        Ok(json!({ "opened": normalize_id(id) }))
    }

    pub async fn subscribe(&self, id: &str) -> CliErrorResult<Value> {
        self.open().await?;
        self.controller.subscribe(id).await?;
        Ok(json!({ "id": normalize_id(id), "subscribed": true }))
    }

    pub async fn unsubscribe(&self, id: &str) -> CliErrorResult<Value> {
        self.open().await?;
        self.controller.unsubscribe(id).await?;
        Ok(json!({ "id": normalize_id(id), "subscribed": false }))
    }

    /// A card's notifications with the current values of the changed fields.
    pub async fn notification_details(&self, id: &str, mark_read: bool) -> CliErrorResult<Value> {
        self.open().await?;
        let session = self.session().await?;
        let details = self.controller.notification_details(id).await?;

        let mut fields = Map::new();
        for field in &details.fields {
            let value = display_value(&details.record, field).map_or(Value::Null, Value::String);
            fields.insert(field.clone(), value);
        }
        let notifications: Vec<Value> = details.notifications.iter().map(notification_json).collect();

        if mark_read {
            self.controller
                .select_record(
                    EntityReference::new(session.primary.logical_name(), id),
                    DisplayType::Notifications,
                )
                .await;
            self.controller.mark_read_and_close().await?;
        }

        Ok(json!({
            "id": normalize_id(id),
            "fields": fields,
            "notifications": notifications,
            "markedRead": mark_read,
        }))
    }

    pub async fn clear_notifications(&self, id: &str) -> CliErrorResult<Value> {
        self.open().await?;
        self.controller.clear_notifications(id).await?;
        Ok(json!({ "id": normalize_id(id), "cleared": true }))
    }

    async fn session(&self) -> CliErrorResult<Arc<pk_board::BoardSession>> {
        self.controller
            .session()
            .await
            .ok_or_else(|| BoardError::configuration("No board is loaded").into())
    }
}

fn notification_json(notification: &Notification) -> Value {
    json!({
        "id": notification.id,
        "event": notification.event.as_str(),
        "createdOn": notification.created_on.map(|d| d.to_rfc3339()),
        "updatedFields": notification.parsed.updated_fields,
    })
}

/// Run the notification producer for one saved event.
pub async fn produce_notifications(
    client: Arc<dyn DataClient>,
    event_path: &Path,
    settings_path: &Path,
) -> CliErrorResult<Value> {
    let settings = read_file(settings_path)?;
    let config = ProducerConfig::from_json(&settings)?;

    let event = read_file(event_path)?;
    let event: RecordEvent = serde_json::from_str(&event)?;

    let producer = NotificationProducer::new(client, config)?;
    let created = producer.handle(&event).await?;
    Ok(json!({ "created": created }))
}

fn read_file(path: &Path) -> CliErrorResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
