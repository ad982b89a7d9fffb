use pk_board::{
    BoardError, BoardResult, FlyOutField, FlyOutFieldKind, FlyOutForm, HookRegistry,
    TransitionContext, TransitionHook, TransitionVerdict,
};
use pk_core::normalize_id;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde_json::{Value, json};

/// Case statuses that close the case: Problem Solved and Information Provided.
pub const RESOLVING_STATUSES: [i32; 2] = [5, 1000];

/// Resolves a case through `CloseIncident` instead of writing its status.
pub struct ResolveCaseHook {
    resolving_statuses: Vec<i32>,
}

impl Default for ResolveCaseHook {
    fn default() -> Self {
        Self {
            resolving_statuses: RESOLVING_STATUSES.to_vec(),
        }
    }
}

impl ResolveCaseHook {
    pub const NAME: &'static str = "onStateTransition";

    pub fn new(resolving_statuses: Vec<i32>) -> Self {
        Self { resolving_statuses }
    }

    pub fn form() -> FlyOutForm {
        FlyOutForm {
            title: "Resolve case".to_string(),
            fields: vec![
                FlyOutField::new("subject", "Subject", FlyOutFieldKind::Text)
                    .required()
                    .with_subtext("Please enter a summary how the case was solved"),
                FlyOutField::new("timespent", "Time spent", FlyOutFieldKind::Number)
                    .required()
                    .with_subtext(
                        "How long did it take you to solve this case (in minutes)?",
                    ),
                FlyOutField::new("description", "Description", FlyOutFieldKind::Textarea)
                    .required()
                    .with_subtext("Please describe how the case was solved"),
            ],
        }
    }
}

#[async_trait]
impl TransitionHook for ResolveCaseHook {
    async fn on_transition(
        &self,
        context: &TransitionContext<'_>,
    ) -> BoardResult<TransitionVerdict> {
        if !self.resolving_statuses.contains(&context.target.value) {
            return Ok(TransitionVerdict::proceed());
        }

        let result = context.show_form(&Self::form()).await?;
        if result.cancelled {
            return Ok(TransitionVerdict::prevent_default());
        }

        let value = |name: &str| result.values.get(name).cloned().unwrap_or(Value::Null);
        let payload = json!({
            "IncidentResolution": {
                "incidentid@odata.bind": format!("/incidents({})", normalize_id(context.record_id)),
                "subject": value("subject"),
                "timespent": value("timespent"),
                "description": value("description"),
            },
            "Status": context.target.value,
        });

        context.set_work_indicator(true).await;
        context
            .client
            .execute("CloseIncident", payload)
            .await
            .map_err(|e| BoardError::hook(Self::NAME, e.to_string()))?;
        info!(
            "Resolved case {} as {}",
            context.record_id,
            context.target.display_label()
        );

        context.refresh().await?;
        Ok(TransitionVerdict::prevent_default())
    }
}

/// Hooks a board configuration can name as its transition callback.
pub fn built_in_hooks() -> HookRegistry {
    HookRegistry::new().with(ResolveCaseHook::NAME, Arc::new(ResolveCaseHook::default()))
}
