mod api_config;
mod board_defaults_config;
mod config;
mod error;
mod log_level;
mod logging_config;

#[cfg(test)]
mod tests;

pub use api_config::ApiConfig;
pub use board_defaults_config::BoardDefaultsConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_VERSION: &str = "9.2";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 600;
const DEFAULT_HIDE_EMPTY_LANES: bool = false;
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;

/// Directory name used when `PK_CONFIG_DIR` is not set.
pub const CONFIG_DIR_NAME: &str = ".pk";
pub const CONFIG_FILE_NAME: &str = "config.toml";
