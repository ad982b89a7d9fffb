pub mod error;
pub mod models;
pub mod query;
pub mod xml;

pub use error::{CoreError, Result as CoreResult};
pub use models::attribute_kind::AttributeKind;
pub use models::attribute_schema::{AttributeSchema, STATE_FIELD};
pub use models::board_config::{BoardConfig, EntityConfig, SecondaryEntityConfig};
pub use models::board_config_summary::BoardConfigSummary;
pub use models::board_lane::BoardLane;
pub use models::board_snapshot::{BoardSnapshot, SecondaryLanes};
pub use models::card_form::{
    CardCell, CardForm, CardRow, CardSegment, FieldLabel, ParsedCard, parse_card_form,
};
pub use models::drag_move::DragMove;
pub use models::entity_metadata::{AttributeDescriptor, EntityMetadata};
pub use models::entity_reference::EntityReference;
pub use models::event_type::EventType;
pub use models::label::{LabelCollection, LocalizedLabel};
pub use models::notification::{Notification, NotificationPayload};
pub use models::picklist_option::PicklistOption;
pub use models::record::{Record, field_text, lookup_value, normalize_id, record_id};
pub use models::saved_view::{LinkedEntity, SavedView, ViewDefinition};
pub use models::subscription::Subscription;
pub use models::transition::{Transition, parse_transition_data};
pub use query::condition::{Condition, ConditionOperator};
pub use query::fetch_query::{FetchQuery, LinkEntity, OrderClause};
pub use query::filter::{Filter, FilterType};

/// Placeholder id used to scope a query to "no records" without dropping the filter.
pub const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Entity holding per-user change notifications.
pub const NOTIFICATION_ENTITY: &str = "oss_notification";
/// Entity linking a user to a watched record.
pub const SUBSCRIPTION_ENTITY: &str = "oss_subscription";

#[cfg(test)]
mod tests;
