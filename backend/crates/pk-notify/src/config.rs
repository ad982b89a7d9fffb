use crate::{NotifyError, NotifyResult};

use serde::{Deserialize, Serialize};

/// How the producer is wired to a watched entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProducerConfig {
    /// Lookup on the changed record pointing at the record notifications hang off.
    /// Unset means the changed record itself.
    #[serde(default)]
    pub parent_lookup_name: Option<String>,
    /// Lookup on the subscription entity holding the watched record.
    pub subscription_lookup_name: String,
    /// Lookup on the notification entity set to the parent record.
    pub notification_lookup_name: String,
    /// Also notify the user who made the change.
    #[serde(default)]
    pub notify_current_user: bool,
}

impl ProducerConfig {
    /// Read the JSON registration settings.
    pub fn from_json(json: &str) -> NotifyResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NotifyError::configuration(format!("unreadable settings: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NotifyResult<()> {
        if self.subscription_lookup_name.trim().is_empty() {
            return Err(NotifyError::configuration(
                "subscriptionLookupName must be set",
            ));
        }
        if self.notification_lookup_name.trim().is_empty() {
            return Err(NotifyError::configuration(
                "notificationLookupName must be set",
            ));
        }
        Ok(())
    }

    pub fn parent_lookup(&self) -> Option<&str> {
        self.parent_lookup_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
