//! Extension point run before a lane change is committed.

use crate::data_client::DataClient;
use crate::form_host::{FlyOutForm, FlyOutResult, FormHost};
use crate::{BoardError, BoardResult};

use pk_core::{PicklistOption, Record};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Re-runs the board fetch and publishes the result.
#[async_trait]
pub trait BoardRefresher: Send + Sync {
    async fn refresh(&self) -> BoardResult<()>;
}

/// The "busy" flag shown while a mutation is in flight.
#[async_trait]
pub trait WorkIndicator: Send + Sync {
    async fn set_work_indicator(&self, busy: bool);
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionVerdict {
    /// Skip the default update of the discriminator field.
    pub prevent_default: bool,
}

impl TransitionVerdict {
    pub fn proceed() -> Self {
        Self {
            prevent_default: false,
        }
    }

    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// What a hook gets to work with.
pub struct TransitionContext<'a> {
    pub entity: &'a str,
    pub record_id: &'a str,
    pub data: &'a Record,
    pub target: &'a PicklistOption,
    pub client: &'a dyn DataClient,
    pub form_host: &'a dyn FormHost,
    pub refresher: &'a dyn BoardRefresher,
    pub indicator: &'a dyn WorkIndicator,
}

impl TransitionContext<'_> {
    pub async fn show_form(&self, form: &FlyOutForm) -> BoardResult<FlyOutResult> {
        self.form_host.show_form(form).await
    }

    pub async fn refresh(&self) -> BoardResult<()> {
        self.refresher.refresh().await
    }

    pub async fn set_work_indicator(&self, busy: bool) {
        self.indicator.set_work_indicator(busy).await;
    }
}

#[async_trait]
pub trait TransitionHook: Send + Sync {
    /// Decide what happens to a valid move. Returning `prevent_default` leaves the
    /// record untouched; the hook then refreshes on its own if it changed anything.
    async fn on_transition(&self, context: &TransitionContext<'_>)
    -> BoardResult<TransitionVerdict>;
}

/// Hooks available to boards, by the name a configuration refers to them with.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn TransitionHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, hook: Arc<dyn TransitionHook>) {
        self.hooks.insert(name.to_string(), hook);
    }

    pub fn with(mut self, name: &str, hook: Arc<dyn TransitionHook>) -> Self {
        self.register(name, hook);
        self
    }

    /// Resolve a configured callback name. An unknown name is a configuration error.
    #[track_caller]
    pub fn resolve(&self, name: Option<&str>) -> BoardResult<Option<Arc<dyn TransitionHook>>> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        // Accept "namespace.function" references by their last segment.
        let short = name.rsplit('.').next().unwrap_or(name);

        self.hooks
            .get(name)
            .or_else(|| self.hooks.get(short))
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                BoardError::configuration(format!("transition callback {name} is not registered"))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
