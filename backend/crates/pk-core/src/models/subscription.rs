use crate::models::record::{Record, lookup_value, normalize_id};
use crate::{CoreError, CoreResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user watching one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub id: String,
    pub owner_id: Option<String>,
    pub watched_record_id: String,
}

impl Subscription {
    pub const ID_FIELD: &'static str = "oss_subscriptionid";

    #[track_caller]
    pub fn from_record(record: &Record, watched_lookup: &str) -> CoreResult<Self> {
        let id = record
            .get(Self::ID_FIELD)
            .and_then(Value::as_str)
            .map(normalize_id)
            .ok_or_else(|| CoreError::validation("subscription without id"))?;

        let watched_record_id = lookup_value(record, watched_lookup).ok_or_else(|| {
            CoreError::validation(format!("subscription {id} has no {watched_lookup} value"))
        })?;

        Ok(Self {
            id,
            owner_id: lookup_value(record, "ownerid"),
            watched_record_id,
        })
    }
}
