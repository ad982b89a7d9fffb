pub mod board_assembler;
pub mod board_filter;
pub mod board_store;
pub mod controller;
pub mod customization;
pub mod data_client;
pub mod error;
pub mod form_host;
pub mod lane_partitioner;
pub mod metadata_resolver;
pub mod move_reconciler;
pub mod notification_tracker;
pub mod query_translator;
pub mod transition_hook;

pub use board_assembler::{
    BoardAssembler, BoardSession, EntityBinding, FetchedBoard, LoadProgress, LoadRequest,
    LoadedBoard, NotificationBinding, SecondaryBinding, SelectionRequest,
};
pub use board_filter::{
    BoardFilters, DisplayMode, apply_filters, parents_with_children, visible_lanes,
};
pub use board_store::{
    ADVANCED_CACHE_KEY, BoardAction, BoardAlert, BoardState, BoardStore, DisplayType,
    LayoutCache, LayoutCaches, Selection, reduce,
};
pub use controller::{BoardController, NotificationDetails};
pub use customization::{CustomizationLoader, NoCustomization};
pub use data_client::{DataClient, OptionSetDefinition};
pub use error::{BoardError, Result as BoardResult, Severity};
pub use form_host::{
    FlyOutField, FlyOutFieldKind, FlyOutForm, FlyOutResult, FormHost, RecordFormOptions,
};
pub use lane_partitioner::{LanePartition, PartitionOptions, drop_targets, partition};
pub use metadata_resolver::MetadataResolver;
pub use move_reconciler::{
    DropRejection, MoveOutcome, MoveReconciler, can_drop, commit_fields,
    validate_drop,
};
pub use notification_tracker::{NotificationIndex, NotificationTracker, SubscriptionIndex};
pub use query_translator::{QueryPlan, scope_to, translate};
pub use transition_hook::{
    BoardRefresher, HookRegistry, TransitionContext, TransitionHook, TransitionVerdict,
    WorkIndicator,
};

#[cfg(test)]
mod tests;
