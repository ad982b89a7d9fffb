//! Turns changes to watched records into per-subscriber notification rows.

pub mod config;
pub mod error;
pub mod event;
pub mod producer;

pub use config::ProducerConfig;
pub use error::{NotifyError, Result as NotifyResult};
pub use event::RecordEvent;
pub use producer::NotificationProducer;

#[cfg(test)]
mod tests;
