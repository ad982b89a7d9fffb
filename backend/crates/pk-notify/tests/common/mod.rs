#![allow(dead_code)]

use pk_board::{BoardError, BoardResult, DataClient, OptionSetDefinition};
use pk_core::{
    AttributeKind, BoardConfigSummary, CardForm, EntityMetadata, FetchQuery, Record, SavedView,
};

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

pub const ACTING_USER: &str = "u-acting";
pub const WATCHER: &str = "u-watcher";

/// Subscription rows in memory; records every create.
#[derive(Default)]
pub struct RecordingClient {
    pub subscriptions: Vec<Record>,
    pub created: RwLock<Vec<(String, Record)>>,
    pub queries: RwLock<Vec<FetchQuery>>,
    pub fail_create: bool,
}

impl RecordingClient {
    pub fn with_subscriptions(subscriptions: Vec<Record>) -> Self {
        Self {
            subscriptions,
            ..Self::default()
        }
    }

    pub async fn created(&self) -> Vec<(String, Record)> {
        self.created.read().await.clone()
    }
}

pub fn subscription(id: &str, case_id: &str, owner: &str, state: i32) -> Record {
    let mut record = Record::new();
    record.insert("oss_subscriptionid".to_string(), json!(id));
    record.insert("_oss_caseid_value".to_string(), json!(case_id));
    record.insert("_ownerid_value".to_string(), json!(owner));
    record.insert("statecode".to_string(), json!(state));
    record
}

fn unsupported(operation: &str) -> BoardError {
    BoardError::data_access(operation, "not available to the producer")
}

#[async_trait]
impl DataClient for RecordingClient {
    async fn current_user_id(&self) -> BoardResult<String> {
        Ok(ACTING_USER.to_string())
    }

    async fn retrieve_entity_metadata(&self, entity: &str) -> BoardResult<EntityMetadata> {
        let set = match entity {
            "systemuser" => "systemusers",
            "team" => "teams",
            "incident" => "incidents",
            other => return Err(BoardError::not_found(format!("entity {other}"))),
        };
        Ok(EntityMetadata {
            logical_name: entity.to_string(),
            primary_id_attribute: format!("{entity}id"),
            primary_name_attribute: None,
            entity_set_name: Some(set.to_string()),
            attributes: Vec::new(),
        })
    }

    async fn retrieve_option_set(
        &self,
        _entity: &str,
        _attribute: &str,
        _kind: AttributeKind,
    ) -> BoardResult<OptionSetDefinition> {
        Err(unsupported("retrieve_option_set"))
    }

    async fn retrieve_multiple(&self, query: &FetchQuery) -> BoardResult<Vec<Record>> {
        self.queries.write().await.push(query.clone());
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| query.matches(r, None))
            .cloned()
            .collect())
    }

    async fn retrieve_record(
        &self,
        _entity: &str,
        _id: &str,
        _columns: &[String],
    ) -> BoardResult<Record> {
        Err(unsupported("retrieve_record"))
    }

    async fn retrieve_saved_views(&self, _entity: &str) -> BoardResult<Vec<SavedView>> {
        Ok(Vec::new())
    }

    async fn retrieve_card_forms(&self, _entity: &str) -> BoardResult<Vec<CardForm>> {
        Ok(Vec::new())
    }

    async fn retrieve_board_configuration(&self, _config_id: &str) -> BoardResult<String> {
        Err(unsupported("retrieve_board_configuration"))
    }

    async fn list_board_configurations(&self) -> BoardResult<Vec<BoardConfigSummary>> {
        Ok(Vec::new())
    }

    async fn retrieve_default_board_id(&self, _user_id: &str) -> BoardResult<Option<String>> {
        Ok(None)
    }

    async fn set_default_board_id(&self, _user_id: &str, _config_id: &str) -> BoardResult<()> {
        Err(unsupported("set_default_board_id"))
    }

    async fn create(&self, entity: &str, fields: Record) -> BoardResult<String> {
        if self.fail_create {
            return Err(BoardError::data_access("create", "500 Internal Server Error"));
        }
        let mut created = self.created.write().await;
        created.push((entity.to_string(), fields));
        Ok(format!("n{}", created.len()))
    }

    async fn update(&self, _entity: &str, _id: &str, _fields: Record) -> BoardResult<()> {
        Err(unsupported("update"))
    }

    async fn delete(&self, _entity: &str, _id: &str) -> BoardResult<()> {
        Err(unsupported("delete"))
    }

    async fn execute(&self, _action: &str, _payload: Value) -> BoardResult<Value> {
        Err(unsupported("execute"))
    }
}
