use crate::{
    ApiConfig, BoardDefaultsConfig, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigError,
    ConfigErrorResult, LoggingConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub board: BoardDefaultsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for PK_CONFIG_DIR env var, else use ./.pk/
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply PK_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: PK_CONFIG_DIR env var > ./.pk/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var("PK_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.api.validate()?;

        if let Some(file) = &self.logging.file
            && file.trim().is_empty()
        {
            return Err(ConfigError::logging("logging.file cannot be empty when set"));
        }

        Ok(())
    }

    /// Log configuration summary (never logs the access token).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  api: {} (timeout {}s, token: {})",
            self.api.data_url(),
            self.api.timeout_secs,
            if self.api.access_token.is_some() {
                "set"
            } else {
                "none"
            }
        );
        info!(
            "  board: {} (hide empty lanes: {})",
            self.board.config_id.as_deref().unwrap_or("user default"),
            self.board.hide_empty_lanes
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Api
        Self::apply_env_string("PK_API_BASE_URL", &mut self.api.base_url);
        Self::apply_env_string("PK_API_VERSION", &mut self.api.api_version);
        Self::apply_env_option_string("PK_API_ACCESS_TOKEN", &mut self.api.access_token);
        Self::apply_env_option_string("PK_API_USER_ID", &mut self.api.user_id);
        Self::apply_env_parse("PK_API_TIMEOUT_SECS", &mut self.api.timeout_secs);

        // Board
        Self::apply_env_option_string("PK_BOARD_CONFIG_ID", &mut self.board.config_id);
        Self::apply_env_bool("PK_BOARD_HIDE_EMPTY_LANES", &mut self.board.hide_empty_lanes);

        // Logging
        Self::apply_env_parse("PK_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("PK_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("PK_LOG_FILE", &mut self.logging.file);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
