use crate::data_client::DataClient;
use crate::{BoardError, BoardResult};

use pk_core::{
    BoardConfig, Condition, ConditionOperator, EntityReference, FetchQuery, Filter, Notification,
    NOTIFICATION_ENTITY, Record, SUBSCRIPTION_ENTITY, Subscription, normalize_id,
};

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, info, warn};
use serde_json::Value;

/// Subscriptions of the current user by watched record id.
pub type SubscriptionIndex = HashMap<String, Vec<Subscription>>;
/// Notifications of the current user by the id of the record that changed.
pub type NotificationIndex = HashMap<String, Vec<Notification>>;

#[derive(Clone)]
pub struct NotificationTracker {
    client: Arc<dyn DataClient>,
}

impl NotificationTracker {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    pub async fn fetch_subscriptions(&self, config: &BoardConfig) -> BoardResult<SubscriptionIndex> {
        let queries = config
            .subscription_lookups()
            .into_iter()
            .map(|(_, lookup)| self.fetch_subscriptions_through(lookup));
        let batches = try_join_all(queries).await?;

        let mut index = SubscriptionIndex::new();
        for subscription in batches.into_iter().flatten() {
            index
                .entry(subscription.watched_record_id.clone())
                .or_default()
                .push(subscription);
        }

        debug!("Indexed subscriptions for {} records", index.len());
        Ok(index)
    }

    pub async fn fetch_notifications(&self, config: &BoardConfig) -> BoardResult<NotificationIndex> {
        let queries = config
            .notification_lookups()
            .into_iter()
            .map(|(_, lookup)| self.fetch_notifications_through(lookup));
        let batches = try_join_all(queries).await?;

        let mut index = NotificationIndex::new();
        for notification in batches.into_iter().flatten() {
            index.entry(notification.target_id()).or_default().push(notification);
        }

        debug!("Indexed notifications for {} records", index.len());
        Ok(index)
    }

    /// Watch `target`. `target_set` is the entity set name used in the relationship binding.
    pub async fn subscribe(
        &self,
        config: &BoardConfig,
        target: &EntityReference,
        target_set: &str,
    ) -> BoardResult<SubscriptionIndex> {
        let lookup = subscription_lookup(config, &target.logical_name)?;

        let mut fields = Record::new();
        fields.insert(
            format!("{lookup}@odata.bind"),
            Value::String(format!("/{target_set}({})", target.normalized_id())),
        );
        self.client.create(SUBSCRIPTION_ENTITY, fields).await?;
        info!("Subscribed to {} {}", target.logical_name, target.id);

        self.fetch_subscriptions(config).await
    }

    /// Remove every subscription of the current user on `target`.
    pub async fn unsubscribe(
        &self,
        config: &BoardConfig,
        target: &EntityReference,
    ) -> BoardResult<SubscriptionIndex> {
        subscription_lookup(config, &target.logical_name)?;

        let current = self.fetch_subscriptions(config).await?;
        let rows = current
            .get(&target.normalized_id())
            .map(Vec::as_slice)
            .unwrap_or_default();

        try_join_all(
            rows.iter()
                .map(|s| self.client.delete(SUBSCRIPTION_ENTITY, &s.id)),
        )
        .await?;
        info!(
            "Removed {} subscription(s) on {} {}",
            rows.len(),
            target.logical_name,
            target.id
        );

        self.fetch_subscriptions(config).await
    }

    /// Delete the given notification rows.
    pub async fn clear_notifications(
        &self,
        config: &BoardConfig,
        notifications: &[Notification],
    ) -> BoardResult<NotificationIndex> {
        try_join_all(
            notifications
                .iter()
                .map(|n| self.client.delete(NOTIFICATION_ENTITY, &n.id)),
        )
        .await?;
        info!("Cleared {} notification(s)", notifications.len());

        self.fetch_notifications(config).await
    }

    /// Delete every notification raised by changes to `record_id`.
    pub async fn clear_for_record(
        &self,
        config: &BoardConfig,
        record_id: &str,
    ) -> BoardResult<NotificationIndex> {
        let current = self.fetch_notifications(config).await?;
        let rows = current
            .get(&normalize_id(record_id))
            .cloned()
            .unwrap_or_default();

        self.clear_notifications(config, &rows).await
    }

    async fn fetch_subscriptions_through(&self, lookup: &str) -> BoardResult<Vec<Subscription>> {
        let query = FetchQuery::new(SUBSCRIPTION_ENTITY)
            .with_attributes(&[Subscription::ID_FIELD, lookup, "ownerid"])
            .with_filter(Filter::and(vec![
                Condition::new("ownerid", ConditionOperator::EqUserId, Vec::new()),
                Condition::new(lookup, ConditionOperator::NotNull, Vec::new()),
            ]));

        let records = self.client.retrieve_multiple(&query).await?;
        Ok(records
            .iter()
            .filter_map(|r| match Subscription::from_record(r, lookup) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("Skipping unreadable subscription: {e}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_notifications_through(&self, lookup: &str) -> BoardResult<Vec<Notification>> {
        let query = FetchQuery::new(NOTIFICATION_ENTITY)
            .with_attributes(&[
                Notification::ID_FIELD,
                Notification::EVENT_FIELD,
                Notification::DATA_FIELD,
                lookup,
                "ownerid",
                "createdon",
            ])
            .with_order("createdon", true)
            .with_filter(Filter::and(vec![
                Condition::new("ownerid", ConditionOperator::EqUserId, Vec::new()),
                Condition::new(lookup, ConditionOperator::NotNull, Vec::new()),
            ]));

        let records = self.client.retrieve_multiple(&query).await?;
        Ok(records
            .iter()
            .filter_map(|r| match Notification::from_record(r, lookup) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("Skipping unreadable notification: {e}");
                    None
                }
            })
            .collect())
    }
}

#[track_caller]
fn subscription_lookup<'a>(config: &'a BoardConfig, entity: &str) -> BoardResult<&'a str> {
    config
        .subscription_lookups()
        .into_iter()
        .find(|(e, _)| *e == entity)
        .map(|(_, lookup)| lookup)
        .ok_or_else(|| BoardError::configuration(format!("{entity} has no subscription lookup")))
}
