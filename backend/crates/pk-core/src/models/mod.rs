pub mod attribute_kind;
pub mod attribute_schema;
pub mod board_config;
pub mod board_config_summary;
pub mod board_lane;
pub mod board_snapshot;
pub mod card_form;
pub mod drag_move;
pub mod entity_metadata;
pub mod entity_reference;
pub mod event_type;
pub mod label;
pub mod notification;
pub mod picklist_option;
pub mod record;
pub mod saved_view;
pub mod subscription;
pub mod transition;
