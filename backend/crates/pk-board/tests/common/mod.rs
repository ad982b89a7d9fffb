#![allow(dead_code)]

use pk_board::{
    BoardError, BoardRefresher, BoardResult, DataClient, FlyOutForm, FlyOutResult, FormHost,
    OptionSetDefinition, RecordFormOptions, WorkIndicator,
};
use pk_core::{
    AttributeDescriptor, AttributeKind, BoardConfig, BoardConfigSummary, CardForm, EntityConfig,
    EntityMetadata, EntityReference, EventType, FetchQuery, LabelCollection, NOTIFICATION_ENTITY,
    PicklistOption, Record, SUBSCRIPTION_ENTITY, SavedView, SecondaryEntityConfig, normalize_id,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const USER_ID: &str = "7d1c2b3a-0000-4000-8000-000000000001";
pub const OTHER_USER_ID: &str = "7d1c2b3a-0000-4000-8000-000000000002";
pub const BOARD_ID: &str = "board-cases";
pub const CASE_LOOKUP: &str = "oss_caseid";

/// A data-access call as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(FetchQuery),
    Retrieve {
        entity: String,
        id: String,
        columns: Vec<String>,
    },
    Create {
        entity: String,
        fields: Record,
    },
    Update {
        entity: String,
        id: String,
        fields: Record,
    },
    Delete {
        entity: String,
        id: String,
    },
    Execute {
        action: String,
        payload: Value,
    },
}

/// In-memory host. Queries are evaluated against stored rows.
#[derive(Default)]
pub struct MockDataClient {
    pub metadata: HashMap<String, EntityMetadata>,
    pub option_sets: HashMap<(String, String), OptionSetDefinition>,
    pub views: HashMap<String, Vec<SavedView>>,
    pub forms: HashMap<String, Vec<CardForm>>,
    pub configurations: HashMap<String, String>,
    pub default_boards: RwLock<HashMap<String, String>>,
    pub records: RwLock<HashMap<String, Vec<Record>>>,
    pub calls: RwLock<Vec<Call>>,
    /// Operation names that fail with a data access error.
    pub failing: RwLock<Vec<String>>,
}

impl MockDataClient {
    pub async fn insert(&self, entity: &str, record: Record) {
        self.records
            .write()
            .await
            .entry(entity.to_string())
            .or_default()
            .push(record);
    }

    pub async fn fail(&self, operation: &str) {
        self.failing.write().await.push(operation.to_string());
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    pub async fn updates(&self) -> Vec<(String, String, Record)> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { entity, id, fields } => Some((entity, id, fields)),
                _ => None,
            })
            .collect()
    }

    pub async fn queries_of(&self, entity: &str) -> Vec<FetchQuery> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(q) if q.entity == entity => Some(q),
                _ => None,
            })
            .collect()
    }

    pub async fn deletes_of(&self, entity_name: &str) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { entity, id } if entity == entity_name => Some(id),
                _ => None,
            })
            .collect()
    }

    pub async fn rows(&self, entity: &str) -> Vec<Record> {
        self.records
            .read()
            .await
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    fn id_attribute(&self, entity: &str) -> String {
        self.metadata
            .get(entity)
            .map(|m| m.primary_id_attribute.clone())
            .unwrap_or_else(|| format!("{entity}id"))
    }

    async fn check(&self, operation: &str) -> BoardResult<()> {
        if self.failing.read().await.iter().any(|o| o == operation) {
            return Err(BoardError::data_access(operation, "503 Service Unavailable"));
        }
        Ok(())
    }

    async fn record(&self, call: Call) {
        self.calls.write().await.push(call);
    }
}

fn same_id(record: &Record, id_attribute: &str, id: &str) -> bool {
    record
        .get(id_attribute)
        .and_then(Value::as_str)
        .is_some_and(|v| normalize_id(v) == normalize_id(id))
}

#[async_trait]
impl DataClient for MockDataClient {
    async fn current_user_id(&self) -> BoardResult<String> {
        Ok(USER_ID.to_string())
    }

    async fn retrieve_entity_metadata(&self, entity: &str) -> BoardResult<EntityMetadata> {
        self.check("metadata").await?;
        self.metadata
            .get(entity)
            .cloned()
            .ok_or_else(|| BoardError::not_found(format!("entity {entity}")))
    }

    async fn retrieve_option_set(
        &self,
        entity: &str,
        attribute: &str,
        _kind: AttributeKind,
    ) -> BoardResult<OptionSetDefinition> {
        self.option_sets
            .get(&(entity.to_string(), attribute.to_string()))
            .cloned()
            .ok_or_else(|| BoardError::not_found(format!("option set {entity}.{attribute}")))
    }

    async fn retrieve_multiple(&self, query: &FetchQuery) -> BoardResult<Vec<Record>> {
        self.record(Call::Query(query.clone())).await;
        self.check("retrieve_multiple").await?;

        Ok(self
            .rows(&query.entity)
            .await
            .into_iter()
            .filter(|r| query.matches(r, Some(USER_ID)))
            .collect())
    }

    async fn retrieve_record(
        &self,
        entity: &str,
        id: &str,
        columns: &[String],
    ) -> BoardResult<Record> {
        self.record(Call::Retrieve {
            entity: entity.to_string(),
            id: id.to_string(),
            columns: columns.to_vec(),
        })
        .await;

        let id_attribute = self.id_attribute(entity);
        let record = self
            .rows(entity)
            .await
            .into_iter()
            .find(|r| same_id(r, &id_attribute, id))
            .ok_or_else(|| BoardError::not_found(format!("{entity} {id}")))?;

        Ok(record
            .into_iter()
            .filter(|(k, _)| *k == id_attribute || columns.contains(k))
            .collect())
    }

    async fn retrieve_saved_views(&self, entity: &str) -> BoardResult<Vec<SavedView>> {
        Ok(self.views.get(entity).cloned().unwrap_or_default())
    }

    async fn retrieve_card_forms(&self, entity: &str) -> BoardResult<Vec<CardForm>> {
        Ok(self.forms.get(entity).cloned().unwrap_or_default())
    }

    async fn retrieve_board_configuration(&self, config_id: &str) -> BoardResult<String> {
        self.configurations
            .get(config_id)
            .cloned()
            .ok_or_else(|| BoardError::not_found(format!("board configuration {config_id}")))
    }

    async fn list_board_configurations(&self) -> BoardResult<Vec<BoardConfigSummary>> {
        let mut summaries: Vec<BoardConfigSummary> = self
            .configurations
            .keys()
            .map(|id| BoardConfigSummary {
                id: id.clone(),
                name: format!("{id}.d365powerkanban.config.json"),
                display_name: Some(id.clone()),
            })
            .collect();
        summaries.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(summaries)
    }

    async fn retrieve_default_board_id(&self, user_id: &str) -> BoardResult<Option<String>> {
        Ok(self.default_boards.read().await.get(user_id).cloned())
    }

    async fn set_default_board_id(&self, user_id: &str, config_id: &str) -> BoardResult<()> {
        self.default_boards
            .write()
            .await
            .insert(user_id.to_string(), config_id.to_string());
        Ok(())
    }

    async fn create(&self, entity: &str, fields: Record) -> BoardResult<String> {
        self.record(Call::Create {
            entity: entity.to_string(),
            fields: fields.clone(),
        })
        .await;
        self.check("create").await?;

        let id = Uuid::new_v4().to_string();
        let mut row = Record::new();
        row.insert(self.id_attribute(entity), json!(id));
        row.insert("_ownerid_value".to_string(), json!(USER_ID));
        for (key, value) in fields {
            match key.strip_suffix("@odata.bind") {
                Some(lookup) => {
                    let target = value
                        .as_str()
                        .and_then(|v| v.split_once('('))
                        .map(|(_, rest)| rest.trim_end_matches(')').to_string())
                        .unwrap_or_default();
                    row.insert(format!("_{lookup}_value"), json!(target));
                }
                None => {
                    row.insert(key, value);
                }
            }
        }
        self.insert(entity, row).await;

        Ok(id)
    }

    async fn update(&self, entity: &str, id: &str, fields: Record) -> BoardResult<()> {
        self.record(Call::Update {
            entity: entity.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
        })
        .await;
        self.check("update").await?;

        let id_attribute = self.id_attribute(entity);
        let mut records = self.records.write().await;
        let row = records
            .get_mut(entity)
            .and_then(|rows| rows.iter_mut().find(|r| same_id(r, &id_attribute, id)))
            .ok_or_else(|| BoardError::not_found(format!("{entity} {id}")))?;
        row.extend(fields);
        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> BoardResult<()> {
        self.record(Call::Delete {
            entity: entity.to_string(),
            id: id.to_string(),
        })
        .await;
        self.check("delete").await?;

        let id_attribute = self.id_attribute(entity);
        if let Some(rows) = self.records.write().await.get_mut(entity) {
            rows.retain(|r| !same_id(r, &id_attribute, id));
        }
        Ok(())
    }

    async fn execute(&self, action: &str, payload: Value) -> BoardResult<Value> {
        self.record(Call::Execute {
            action: action.to_string(),
            payload,
        })
        .await;
        self.check("execute").await?;
        Ok(json!({}))
    }
}

/// Form host that answers from canned values.
#[derive(Default)]
pub struct MockFormHost {
    pub saved: Option<EntityReference>,
    pub fly_out: Option<FlyOutResult>,
    pub opened: RwLock<Vec<(String, Option<String>, RecordFormOptions)>>,
    pub shown: RwLock<Vec<FlyOutForm>>,
}

#[async_trait]
impl FormHost for MockFormHost {
    async fn open_record_form(
        &self,
        entity: &str,
        id: Option<&str>,
        options: &RecordFormOptions,
    ) -> BoardResult<Option<EntityReference>> {
        self.opened.write().await.push((
            entity.to_string(),
            id.map(str::to_string),
            options.clone(),
        ));
        Ok(self.saved.clone())
    }

    async fn show_form(&self, form: &FlyOutForm) -> BoardResult<FlyOutResult> {
        self.shown.write().await.push(form.clone());
        Ok(self.fly_out.clone().unwrap_or_else(FlyOutResult::cancelled))
    }
}

#[derive(Default)]
pub struct CountingRefresher {
    pub count: AtomicUsize,
}

impl CountingRefresher {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoardRefresher for CountingRefresher {
    async fn refresh(&self) -> BoardResult<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingIndicator {
    pub states: RwLock<Vec<bool>>,
}

#[async_trait]
impl WorkIndicator for RecordingIndicator {
    async fn set_work_indicator(&self, busy: bool) {
        self.states.write().await.push(busy);
    }
}

fn attribute(name: &str, kind: &str) -> AttributeDescriptor {
    AttributeDescriptor {
        logical_name: name.to_string(),
        attribute_type: kind.to_string(),
        display_name: LabelCollection::from_text(name),
    }
}

fn metadata(entity: &str, id: &str, set: &str, attributes: Vec<AttributeDescriptor>) -> EntityMetadata {
    EntityMetadata {
        logical_name: entity.to_string(),
        primary_id_attribute: id.to_string(),
        primary_name_attribute: None,
        entity_set_name: Some(set.to_string()),
        attributes,
    }
}

fn card_form(id: &str, header: &str, body: &str) -> CardForm {
    let cell = |field: &str| {
        format!(
            r#"<row><cell><labels><label description="{field}" languagecode="1033" /></labels><control datafieldname="{field}" /></cell></row>"#
        )
    };
    CardForm {
        id: id.to_string(),
        name: format!("Card {id}"),
        form_xml: format!(
            r#"<form><tabs><tab><columns><column><sections><section name="CardHeader"><rows>{}</rows></section><section name="CardDetails"><rows>{}</rows></section><section name="CardFooter" /></sections></column></columns></tab></tabs></form>"#,
            cell(header),
            cell(body)
        ),
        parsed: Default::default(),
    }
}

fn view(id: &str, entity: &str, attributes: &[&str]) -> SavedView {
    let attributes: String = attributes
        .iter()
        .map(|a| format!(r#"<attribute name="{a}" />"#))
        .collect();
    SavedView {
        id: id.to_string(),
        name: format!("View {id}"),
        fetch_xml: format!(
            r#"<fetch version="1.0" mapping="logical"><entity name="{entity}">{attributes}<filter type="and"><condition attribute="statecode" operator="ne" value="2" /></filter></entity></fetch>"#
        ),
        layout_xml: String::new(),
    }
}

/// Open(1), Done(2) active; Closed(3) inactive. Done cannot go back to Open.
pub fn case_status_options() -> Vec<PicklistOption> {
    vec![
        PicklistOption::new(1, 0, "Open").with_color("#3b79b7"),
        PicklistOption::new(2, 0, "Done").with_transition_data(
            r#"<allowedtransitions><allowedtransition sourcestatusid="2" tostatusid="3" /></allowedtransitions>"#,
        ),
        PicklistOption::new(3, 1, "Closed"),
    ]
}

pub fn board_config(secondary: bool) -> BoardConfig {
    BoardConfig {
        primary_entity: EntityConfig {
            logical_name: "incident".to_string(),
            swim_lane_source: "statuscode".to_string(),
            notification_lookup: Some(CASE_LOOKUP.to_string()),
            subscription_lookup: Some(CASE_LOOKUP.to_string()),
        },
        secondary_entity: secondary.then(|| SecondaryEntityConfig {
            entity: EntityConfig {
                logical_name: "task".to_string(),
                swim_lane_source: "oss_blocked".to_string(),
                notification_lookup: None,
                subscription_lookup: None,
            },
            parent_lookup: "regardingobjectid".to_string(),
        }),
        custom_script_url: None,
        transition_callback: None,
        default_view_id: None,
        show_create_button: true,
        show_delete_button: false,
        show_deactivate_button: false,
        hide_empty_lanes: false,
    }
}

/// A case board host: incidents by status, tasks by a blocked flag.
pub fn mock_client(config: &BoardConfig) -> MockDataClient {
    let mut client = MockDataClient::default();

    client.metadata.insert(
        "incident".to_string(),
        metadata(
            "incident",
            "incidentid",
            "incidents",
            vec![
                attribute("incidentid", "Uniqueidentifier"),
                attribute("title", "String"),
                attribute("description", "Memo"),
                attribute("statuscode", "Status"),
                attribute("statecode", "State"),
            ],
        ),
    );
    client.metadata.insert(
        "task".to_string(),
        metadata(
            "task",
            "activityid",
            "tasks",
            vec![
                attribute("activityid", "Uniqueidentifier"),
                attribute("subject", "String"),
                attribute("oss_blocked", "Boolean"),
                attribute("regardingobjectid", "Lookup"),
            ],
        ),
    );
    client.metadata.insert(
        NOTIFICATION_ENTITY.to_string(),
        metadata(
            NOTIFICATION_ENTITY,
            "oss_notificationid",
            "oss_notifications",
            vec![attribute("oss_event", "Picklist")],
        ),
    );
    client.metadata.insert(
        SUBSCRIPTION_ENTITY.to_string(),
        metadata(
            SUBSCRIPTION_ENTITY,
            "oss_subscriptionid",
            "oss_subscriptions",
            Vec::new(),
        ),
    );

    client.option_sets.insert(
        ("incident".to_string(), "statuscode".to_string()),
        OptionSetDefinition::Options(case_status_options()),
    );
    client.option_sets.insert(
        ("incident".to_string(), "statecode".to_string()),
        OptionSetDefinition::Options(vec![
            PicklistOption::new(0, 0, "Active"),
            PicklistOption::new(1, 1, "Resolved"),
        ]),
    );
    client.option_sets.insert(
        ("task".to_string(), "oss_blocked".to_string()),
        OptionSetDefinition::TwoOptions {
            false_option: PicklistOption::new(0, 0, "Flowing"),
            true_option: PicklistOption::new(1, 0, "Blocked"),
        },
    );

    client.views.insert(
        "incident".to_string(),
        vec![
            view("v-active", "incident", &["title"]),
            view("v-all", "incident", &["title", "description"]),
        ],
    );
    client
        .views
        .insert("task".to_string(), vec![view("v-tasks", "task", &["subject"])]);
    client.forms.insert(
        "incident".to_string(),
        vec![
            card_form("f-case", "title", "description"),
            card_form("f-compact", "title", "title"),
        ],
    );
    client
        .forms
        .insert("task".to_string(), vec![card_form("f-task", "subject", "subject")]);
    client.forms.insert(
        NOTIFICATION_ENTITY.to_string(),
        vec![card_form("f-notification", "oss_event", "oss_data")],
    );

    if let Ok(blob) = config.encode() {
        client.configurations.insert(BOARD_ID.to_string(), blob);
    }

    client
}

pub fn case(id: &str, status: i32, title: &str) -> Record {
    let mut record = Record::new();
    record.insert("incidentid".to_string(), json!(id));
    record.insert("title".to_string(), json!(title));
    record.insert("description".to_string(), json!(format!("About {title}")));
    record.insert("statuscode".to_string(), json!(status));
    record.insert("statecode".to_string(), json!(if status == 3 { 1 } else { 0 }));
    record
}

pub fn task(id: &str, parent: &str, blocked: bool) -> Record {
    let mut record = Record::new();
    record.insert("activityid".to_string(), json!(id));
    record.insert("subject".to_string(), json!(format!("Task {id}")));
    record.insert("oss_blocked".to_string(), json!(blocked));
    record.insert("_regardingobjectid_value".to_string(), json!(parent));
    record.insert("statecode".to_string(), json!(0));
    record
}

pub fn notification(id: &str, case_id: &str, owner: &str, fields: &[&str]) -> Record {
    let data = json!({
        "updatedFields": fields,
        "eventRecordReference": { "Id": case_id, "LogicalName": "incident" }
    });
    let mut record = Record::new();
    record.insert("oss_notificationid".to_string(), json!(id));
    record.insert("oss_event".to_string(), json!(i32::from(EventType::Update)));
    record.insert("oss_data".to_string(), json!(data.to_string()));
    record.insert(format!("_{CASE_LOOKUP}_value"), json!(case_id));
    record.insert("_ownerid_value".to_string(), json!(owner));
    record.insert("createdon".to_string(), json!("2026-03-01T10:00:00Z"));
    record
}

pub fn subscription(id: &str, case_id: &str, owner: &str) -> Record {
    let mut record = Record::new();
    record.insert("oss_subscriptionid".to_string(), json!(id));
    record.insert(format!("_{CASE_LOOKUP}_value"), json!(case_id));
    record.insert("_ownerid_value".to_string(), json!(owner));
    record
}
