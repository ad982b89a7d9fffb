use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
    MAX_TIMEOUT_SECS,
};

use std::time::Duration;

use serde::Deserialize;

/// Connection to the host's Web API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Organisation root, e.g. `https://contoso.crm.dynamics.com`
    pub base_url: String,
    pub api_version: String,
    /// Bearer token; obtaining one is the caller's business
    pub access_token: Option<String>,
    /// Acting user id. Looked up with `WhoAmI` when absent.
    pub user_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_version: String::from(DEFAULT_API_VERSION),
            access_token: None,
            user_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::api("api.base_url cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::api(format!(
                "api.base_url must start with http:// or https://, got {base_url}"
            )));
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::api("api.api_version cannot be empty"));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::api(format!(
                "api.timeout_secs must be 1-{MAX_TIMEOUT_SECS}, got {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }

    /// `<base>/api/data/v<version>/`
    pub fn data_url(&self) -> String {
        format!(
            "{}/api/data/v{}/",
            self.base_url.trim().trim_end_matches('/'),
            self.api_version.trim()
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
