//! The host's data services, as the board sees them.

use crate::BoardResult;

use pk_core::{
    AttributeKind, BoardConfigSummary, CardForm, EntityMetadata, FetchQuery, PicklistOption,
    Record, SavedView,
};

use async_trait::async_trait;
use serde_json::Value;

/// Raw option set of a discriminator attribute, as the host describes it.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSetDefinition {
    Options(Vec<PicklistOption>),
    TwoOptions {
        false_option: PicklistOption,
        true_option: PicklistOption,
    },
}

/// Opaque access to entity metadata, views, forms and records.
///
/// Implementations report failures as `BoardError::DataAccess`. Records come
/// back raw, lookups as `_<name>_value`, with formatted-value annotations when
/// the host provides them.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Id of the acting user.
    async fn current_user_id(&self) -> BoardResult<String>;

    async fn retrieve_entity_metadata(&self, entity: &str) -> BoardResult<EntityMetadata>;

    /// Option set of one attribute, expanded through the metadata sub-type matching `kind`.
    async fn retrieve_option_set(
        &self,
        entity: &str,
        attribute: &str,
        kind: AttributeKind,
    ) -> BoardResult<OptionSetDefinition>;

    /// All pages of a structured query.
    async fn retrieve_multiple(&self, query: &FetchQuery) -> BoardResult<Vec<Record>>;

    async fn retrieve_record(&self, entity: &str, id: &str, columns: &[String])
    -> BoardResult<Record>;

    /// Public system views of an entity.
    async fn retrieve_saved_views(&self, entity: &str) -> BoardResult<Vec<SavedView>>;

    /// Card layout forms of an entity, unparsed.
    async fn retrieve_card_forms(&self, entity: &str) -> BoardResult<Vec<CardForm>>;

    /// The encoded configuration blob stored under `config_id`.
    async fn retrieve_board_configuration(&self, config_id: &str) -> BoardResult<String>;

    async fn list_board_configurations(&self) -> BoardResult<Vec<BoardConfigSummary>>;

    /// The board a user opens when none is named.
    async fn retrieve_default_board_id(&self, user_id: &str) -> BoardResult<Option<String>>;

    async fn set_default_board_id(&self, user_id: &str, config_id: &str) -> BoardResult<()>;

    async fn create(&self, entity: &str, fields: Record) -> BoardResult<String>;

    async fn update(&self, entity: &str, id: &str, fields: Record) -> BoardResult<()>;

    async fn delete(&self, entity: &str, id: &str) -> BoardResult<()>;

    /// Run an unbound host action such as `CloseIncident`.
    async fn execute(&self, action: &str, payload: Value) -> BoardResult<Value>;
}
