use crate::{NotifyResult, ProducerConfig, RecordEvent};

use pk_board::DataClient;
use pk_core::{
    Condition, ConditionOperator, EntityReference, FetchQuery, Filter, NOTIFICATION_ENTITY,
    Notification, Record, SUBSCRIPTION_ENTITY, STATE_FIELD, lookup_value,
};

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, info, warn};
use serde_json::Value;

const OWNER_TYPE_ANNOTATION: &str = "_ownerid_value@Microsoft.Dynamics.CRM.lookuplogicalname";

pub struct NotificationProducer {
    client: Arc<dyn DataClient>,
    config: ProducerConfig,
}

impl NotificationProducer {
    pub fn new(client: Arc<dyn DataClient>, config: ProducerConfig) -> NotifyResult<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Write one notification per active subscription on the event's record.
    /// Returns the ids of the created notifications.
    pub async fn handle(&self, event: &RecordEvent) -> NotifyResult<Vec<String>> {
        let Some(payload) = event.payload() else {
            debug!("{} event without target, nothing to notify", event.message_name);
            return Ok(Vec::new());
        };
        let target = &payload.event_record_reference;

        let Some(parent) = self.resolve_parent(event, target) else {
            warn!(
                "No parent found for {} {}, skipping notifications",
                target.logical_name, target.id
            );
            return Ok(Vec::new());
        };

        let subscribers = self.subscribers(event, target).await?;
        if subscribers.is_empty() {
            debug!("Nobody watches {} {}", target.logical_name, target.id);
            return Ok(Vec::new());
        }

        let data = serde_json::to_string(&payload)?;
        let event_type = event.event_type();

        let mut set_names = HashMap::new();
        for logical_name in subscribers
            .iter()
            .map(|owner| owner.logical_name.as_str())
            .chain([parent.logical_name.as_str()])
        {
            if !set_names.contains_key(logical_name) {
                let metadata = self.client.retrieve_entity_metadata(logical_name).await?;
                set_names.insert(logical_name.to_string(), metadata.set_name().to_string());
            }
        }
        let binding = |reference: &EntityReference| {
            let set = set_names
                .get(&reference.logical_name)
                .map(String::as_str)
                .unwrap_or_default();
            Value::String(format!("/{set}({})", reference.normalized_id()))
        };

        let rows = subscribers.iter().map(|owner| {
            let mut fields = Record::new();
            fields.insert("ownerid@odata.bind".to_string(), binding(owner));
            fields.insert(
                Notification::EVENT_FIELD.to_string(),
                Value::from(i32::from(event_type)),
            );
            fields.insert(
                format!("{}@odata.bind", self.config.notification_lookup_name),
                binding(&parent),
            );
            fields.insert(Notification::DATA_FIELD.to_string(), Value::String(data.clone()));
            fields
        });
        let created = try_join_all(rows.map(|fields| self.client.create(NOTIFICATION_ENTITY, fields)))
            .await?;

        info!(
            "Created {} {} notification(s) for {} {}",
            created.len(),
            event_type.as_str(),
            target.logical_name,
            target.id
        );
        Ok(created)
    }

    fn resolve_parent(&self, event: &RecordEvent, target: &EntityReference) -> Option<EntityReference> {
        match self.config.parent_lookup() {
            None => Some(target.clone()),
            Some(lookup) => event.pre_image_reference(lookup),
        }
    }

    /// Owners of active subscriptions on `target`.
    async fn subscribers(
        &self,
        event: &RecordEvent,
        target: &EntityReference,
    ) -> NotifyResult<Vec<EntityReference>> {
        let mut conditions = vec![
            Condition::eq(&self.config.subscription_lookup_name, &target.normalized_id()),
            Condition::eq(STATE_FIELD, "0"),
        ];
        if !self.config.notify_current_user {
            conditions.push(Condition::new(
                "ownerid",
                ConditionOperator::Ne,
                vec![event.user_id.clone()],
            ));
        }

        let query = FetchQuery::new(SUBSCRIPTION_ENTITY)
            .with_attributes(&["ownerid"])
            .with_filter(Filter::and(conditions));
        let rows = self.client.retrieve_multiple(&query).await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let Some(owner) = lookup_value(row, "ownerid") else {
                    warn!("Skipping subscription without owner");
                    return None;
                };
                let owner_type = row
                    .get(OWNER_TYPE_ANNOTATION)
                    .and_then(Value::as_str)
                    .unwrap_or("systemuser");
                Some(EntityReference::new(owner_type, &owner))
            })
            .collect())
    }
}
