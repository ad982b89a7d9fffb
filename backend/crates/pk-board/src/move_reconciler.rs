//! Drag-and-drop moves: validation, the transition hook, and the commit.

use crate::data_client::DataClient;
use crate::form_host::FormHost;
use crate::transition_hook::{BoardRefresher, TransitionContext, TransitionHook, WorkIndicator};
use crate::BoardResult;

use pk_core::{AttributeSchema, DragMove, PicklistOption, Record};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Why a drop was refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DropRejection {
    NoTarget,
    SameLane,
    UnknownTarget,
    NotAllowed,
}

/// The state a move ends in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped on an invalid target. Nothing happened; not an error.
    Ignored(DropRejection),
    /// The hook prevented the default update, either cancelling or taking over.
    Cancelled,
    Committed,
}

/// Check a drop against the schema and the source lane's transition restrictions.
pub fn validate_drop<'a>(
    schema: &'a AttributeSchema,
    drag: &DragMove,
) -> Result<&'a PicklistOption, DropRejection> {
    let target = drag.target.ok_or(DropRejection::NoTarget)?;
    if drag.source == Some(target) {
        return Err(DropRejection::SameLane);
    }

    let target_option = schema.option(target).ok_or(DropRejection::UnknownTarget)?;

    let allowed = drag
        .source
        .and_then(|source| schema.option(source))
        .is_none_or(|source| source.allows_move_to(target));
    if !allowed {
        return Err(DropRejection::NotAllowed);
    }

    Ok(target_option)
}

/// The drop-target check the view layer runs while hovering.
pub fn can_drop(schema: &AttributeSchema, source: Option<i32>, target: i32) -> bool {
    let hover = DragMove {
        record_id: String::new(),
        record: Record::new(),
        source,
        target: Some(target),
    };
    validate_drop(schema, &hover).is_ok()
}

/// The fields written when committing a move to `target`.
pub fn commit_fields(schema: &AttributeSchema, target: &PicklistOption) -> Record {
    let mut fields = Record::new();
    fields.insert(schema.logical_name.clone(), schema.field_value(target));
    if let Some((companion, value)) = schema.companion_write(target) {
        fields.insert(companion.to_string(), value);
    }
    fields
}

pub struct MoveReconciler {
    client: Arc<dyn DataClient>,
    form_host: Arc<dyn FormHost>,
    hook: Option<(String, Arc<dyn TransitionHook>)>,
}

impl MoveReconciler {
    pub fn new(client: Arc<dyn DataClient>, form_host: Arc<dyn FormHost>) -> Self {
        Self {
            client,
            form_host,
            hook: None,
        }
    }

    pub fn with_hook(mut self, name: &str, hook: Arc<dyn TransitionHook>) -> Self {
        self.hook = Some((name.to_string(), hook));
        self
    }

    /// Run one move to completion.
    ///
    /// At most one update and one refresh are issued. The work indicator is
    /// raised at most once: by the hook while it owns the move, or just before
    /// the default update. It is cleared once at the end, and only if raised.
    /// A refresh failure after a successful update does not fail the move.
    pub async fn reconcile(
        &self,
        schema: &AttributeSchema,
        drag: &DragMove,
        refresher: &dyn BoardRefresher,
        indicator: &dyn WorkIndicator,
    ) -> BoardResult<MoveOutcome> {
        let target = match validate_drop(schema, drag) {
            Ok(target) => target,
            Err(rejection) => {
                debug!("Ignoring drop of {}: {rejection:?}", drag.record_id);
                return Ok(MoveOutcome::Ignored(rejection));
            }
        };

        let indicator = TrackedIndicator::new(indicator);
        let result = self.run(schema, drag, target, refresher, &indicator).await;
        indicator.set_work_indicator(false).await;

        result
    }

    async fn run(
        &self,
        schema: &AttributeSchema,
        drag: &DragMove,
        target: &PicklistOption,
        refresher: &dyn BoardRefresher,
        indicator: &dyn WorkIndicator,
    ) -> BoardResult<MoveOutcome> {
        if let Some((name, hook)) = &self.hook {
            let context = TransitionContext {
                entity: &schema.entity,
                record_id: &drag.record_id,
                data: &drag.record,
                target,
                client: self.client.as_ref(),
                form_host: self.form_host.as_ref(),
                refresher,
                indicator,
            };

            let verdict = hook.on_transition(&context).await.inspect_err(|e| {
                warn!("Transition hook {name} failed for {}: {e}", drag.record_id);
            })?;

            if verdict.prevent_default {
                info!(
                    "Transition hook {name} took over the move of {} to {}",
                    drag.record_id,
                    target.display_label()
                );
                return Ok(MoveOutcome::Cancelled);
            }
        }

        indicator.set_work_indicator(true).await;
        self.client
            .update(&schema.entity, &drag.record_id, commit_fields(schema, target))
            .await?;
        info!(
            "Moved {} {} to {} ({})",
            schema.entity,
            drag.record_id,
            target.display_label(),
            target.value
        );

        if let Err(e) = refresher.refresh().await {
            warn!("Refresh after moving {} failed: {e}", drag.record_id);
        }
        Ok(MoveOutcome::Committed)
    }
}

/// Forwards only changes of the busy flag, so repeated raises collapse into one.
struct TrackedIndicator<'a> {
    inner: &'a dyn WorkIndicator,
    raised: AtomicBool,
}

impl<'a> TrackedIndicator<'a> {
    fn new(inner: &'a dyn WorkIndicator) -> Self {
        Self {
            inner,
            raised: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl WorkIndicator for TrackedIndicator<'_> {
    async fn set_work_indicator(&self, busy: bool) {
        if self.raised.swap(busy, Ordering::SeqCst) == busy {
            return;
        }
        self.inner.set_work_indicator(busy).await;
    }
}
