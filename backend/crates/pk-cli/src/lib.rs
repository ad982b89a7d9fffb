//! pk-cli library
//!
//! Web API client, terminal form host and command implementations behind the `pk` binary.

pub mod app;
pub(crate) mod client;
pub mod customization;
pub mod error;
pub mod form_host;
pub mod hooks;
pub mod logger;
pub mod output;

#[cfg(test)]
mod tests;

pub use app::{BoardApp, ShowOptions, produce_notifications};
pub use client::{CliClientResult, ClientError, WebApiClient, entity_id_from_uri};
pub use customization::WebResourceLoader;
pub use error::{CliError, Result as CliErrorResult};
pub use form_host::{TerminalFormHost, field_value};
pub use hooks::{ResolveCaseHook, built_in_hooks};
