mod common;

use common::{
    BOARD_ID, MockDataClient, MockFormHost, USER_ID, board_config, case, mock_client, task,
};

use pk_board::{
    BoardController, BoardError, BoardFilters, DataClient, DisplayMode, HookRegistry,
    LoadRequest, NoCustomization, RecordFormOptions, SelectionRequest, Severity,
};
use pk_core::{BoardConfig, BoardLane, EntityReference, record_id};

use std::sync::Arc;

use googletest::prelude::*;

async fn board_with(
    config: BoardConfig,
    form_host: MockFormHost,
) -> (Arc<MockDataClient>, Arc<MockFormHost>, BoardController) {
    let client = Arc::new(mock_client(&config));
    client.insert("incident", case("c1", 1, "Printer on fire")).await;
    client.insert("incident", case("c2", 2, "Password reset")).await;
    client.insert("incident", case("c3", 1, "VPN drops")).await;
    client.insert("task", task("t1", "c1", false)).await;
    client.insert("task", task("t2", "c1", true)).await;

    let form_host = Arc::new(form_host);
    let data: Arc<dyn DataClient> = client.clone();
    let controller = BoardController::new(
        data,
        form_host.clone(),
        Arc::new(NoCustomization),
        HookRegistry::new(),
    );
    controller
        .load(&LoadRequest {
            config_id: Some(BOARD_ID.to_string()),
            hide_empty_lanes: false,
            ..LoadRequest::default()
        })
        .await
        .unwrap();
    (client, form_host, controller)
}

async fn board() -> (Arc<MockDataClient>, Arc<MockFormHost>, BoardController) {
    board_with(board_config(false), MockFormHost::default()).await
}

fn ids(lanes: &[BoardLane], id_attribute: &str) -> Vec<Vec<String>> {
    lanes
        .iter()
        .map(|l| l.data.iter().filter_map(|r| record_id(r, id_attribute)).collect())
        .collect()
}

#[tokio::test]
async fn given_loaded_board_when_view_selected_then_refetched_with_its_columns() {
    let (client, _, controller) = board().await;

    controller.select_view("v-all").await.unwrap();

    let queries = client.queries_of("incident").await;
    assert_that!(queries.len(), eq(2));
    assert!(queries[1].attributes.iter().any(|a| a == "description"));
    let state = controller.state().await;
    assert_that!(
        state.selection.primary_view.as_ref().map(|v| v.id.as_str()),
        some(eq("v-all"))
    );
    assert_that!(state.published_ticket, eq(2));
}

#[tokio::test]
async fn given_loaded_board_when_form_selected_then_selection_updated() {
    let (_, _, controller) = board().await;

    controller.select_form("F-COMPACT").await.unwrap();

    let state = controller.state().await;
    assert_that!(
        state.selection.primary_form.as_ref().map(|f| f.id.as_str()),
        some(eq("f-compact"))
    );
}

#[tokio::test]
async fn given_unknown_view_when_selected_then_not_found_and_selection_kept() {
    let (client, _, controller) = board().await;

    let result = controller.select_view("v-missing").await;

    assert!(matches!(result, Err(BoardError::NotFound { .. })));
    let state = controller.state().await;
    assert_that!(
        state.selection.primary_view.as_ref().map(|v| v.id.as_str()),
        some(eq("v-active"))
    );
    assert_that!(
        state.alert.as_ref().map(|a| a.severity),
        some(eq(Severity::Alert))
    );
    assert_that!(client.queries_of("incident").await.len(), eq(1));
}

#[tokio::test]
async fn given_board_without_secondary_when_secondary_view_selected_then_configuration_error() {
    let (_, _, controller) = board().await;

    let result = controller.select_secondary_view("v-tasks").await;

    assert!(matches!(result, Err(BoardError::Configuration { .. })));
}

#[tokio::test]
async fn given_secondary_board_when_secondary_view_selected_then_tasks_refetched() {
    let (client, _, controller) =
        board_with(board_config(true), MockFormHost::default()).await;

    controller.select_secondary_view("v-tasks").await.unwrap();

    assert_that!(client.queries_of("task").await.len(), eq(2));
}

#[tokio::test]
async fn given_nothing_loaded_when_refreshed_then_configuration_error() {
    let client = Arc::new(MockDataClient::default());
    let data: Arc<dyn DataClient> = client.clone();
    let controller = BoardController::new(
        data,
        Arc::new(MockFormHost::default()),
        Arc::new(NoCustomization),
        HookRegistry::new(),
    );

    let result = controller.refresh().await;

    assert!(matches!(result, Err(BoardError::Configuration { .. })));
    assert!(client.calls().await.is_empty());
}

#[tokio::test]
async fn given_quick_create_saved_when_creating_then_board_refreshed() {
    let form_host = MockFormHost {
        saved: Some(EntityReference::new("incident", "c9")),
        ..MockFormHost::default()
    };
    let (client, form_host, controller) = board_with(board_config(false), form_host).await;

    let saved = controller.create_record().await.unwrap();

    assert_that!(saved.map(|r| r.id), some(eq("c9")));
    let opened = form_host.opened.read().await.clone();
    assert_that!(opened.len(), eq(1));
    assert_that!(opened[0].0.as_str(), eq("incident"));
    assert!(opened[0].1.is_none());
    assert_eq!(
        opened[0].2,
        RecordFormOptions {
            use_quick_create_form: true,
            open_in_new_window: false,
        }
    );
    assert_that!(client.queries_of("incident").await.len(), eq(2));
}

#[tokio::test]
async fn given_quick_create_dismissed_when_creating_then_no_refresh() {
    let (client, _, controller) = board().await;

    let saved = controller.create_record().await.unwrap();

    assert!(saved.is_none());
    assert_that!(client.queries_of("incident").await.len(), eq(1));
}

#[tokio::test]
async fn given_card_when_opened_then_editor_opens_in_new_window() {
    let (_, form_host, controller) = board().await;

    controller.open_record("c2").await.unwrap();

    let opened = form_host.opened.read().await.clone();
    assert_that!(opened[0].1.as_deref(), some(eq("c2")));
    assert!(opened[0].2.open_in_new_window);
    assert!(!opened[0].2.use_quick_create_form);
}

#[tokio::test]
async fn given_task_card_when_opened_then_task_editor_used() {
    let (_, form_host, controller) =
        board_with(board_config(true), MockFormHost::default()).await;

    controller.open_record("t2").await.unwrap();

    let opened = form_host.opened.read().await.clone();
    assert_that!(opened[0].0.as_str(), eq("task"));
}

#[tokio::test]
async fn given_configurations_when_listed_and_default_set_then_user_default_stored() {
    let (client, _, controller) = board().await;

    let boards = controller.list_board_configurations().await.unwrap();
    assert_that!(boards.len(), eq(1));
    assert_that!(boards[0].id.as_str(), eq(BOARD_ID));

    controller.set_default_board(BOARD_ID).await.unwrap();

    assert_that!(
        client.default_boards.read().await.get(USER_ID).cloned(),
        some(eq(BOARD_ID))
    );
}

#[tokio::test]
async fn given_cards_when_drop_targets_asked_then_restrictions_applied() {
    let (_, _, controller) = board().await;

    assert_eq!(controller.drop_targets("c2").await.unwrap(), vec![3]);
    assert_eq!(controller.drop_targets("c1").await.unwrap(), vec![2, 3]);
    assert!(matches!(
        controller.drop_targets("c404").await,
        Err(BoardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn given_state_filter_when_toggled_then_lanes_follow() {
    let (_, _, controller) = board().await;

    controller
        .set_filters(BoardFilters {
            states: vec![1],
            search: None,
        })
        .await;
    let lanes = controller.visible_lanes().await.unwrap();
    let values: Vec<Option<i32>> = lanes.iter().map(BoardLane::value).collect();
    assert_eq!(values, vec![Some(3)]);

    controller.toggle_state_filter(1).await;
    let lanes = controller.visible_lanes().await.unwrap();
    assert_that!(lanes.len(), eq(3));
}

#[tokio::test]
async fn given_search_when_set_then_only_matching_cards_visible() {
    let (_, _, controller) = board().await;

    controller.set_search(Some("PRINTER".to_string())).await;

    let lanes = controller.visible_lanes().await.unwrap();
    assert_eq!(
        ids(&lanes, "incidentid"),
        vec![vec!["c1".to_string()], Vec::new(), Vec::new()]
    );
}

#[tokio::test]
async fn given_secondary_mode_when_lanes_shown_then_parents_move_to_their_rows() {
    let (_, _, controller) = board_with(board_config(true), MockFormHost::default()).await;

    controller.set_display_mode(DisplayMode::Secondary).await;

    let lanes = controller.visible_lanes().await.unwrap();
    assert_eq!(
        ids(&lanes, "incidentid"),
        vec![vec!["c3".to_string()], vec!["c2".to_string()], Vec::new()]
    );

    let children = controller.secondary_lanes("c1").await;
    assert_eq!(
        ids(&children, "activityid"),
        vec![vec!["t1".to_string()], vec!["t2".to_string()]]
    );
    assert!(controller.secondary_lanes("c3").await.iter().all(BoardLane::is_empty));
}

#[tokio::test]
async fn given_alert_when_dismissed_then_cleared() {
    let (_, _, controller) = board().await;
    let _ = controller.select_view("v-missing").await;
    assert!(controller.state().await.alert.is_some());

    controller.dismiss_alert().await;

    assert!(controller.state().await.alert.is_none());
}

async fn load_selecting(
    config: BoardConfig,
    selection: SelectionRequest,
) -> (Arc<MockDataClient>, BoardController, pk_board::BoardResult<()>) {
    let client = Arc::new(mock_client(&config));
    client.insert("incident", case("c1", 1, "Printer on fire")).await;
    client.insert("task", task("t1", "c1", false)).await;
    let data: Arc<dyn DataClient> = client.clone();
    let controller = BoardController::new(
        data,
        Arc::new(MockFormHost::default()),
        Arc::new(NoCustomization),
        HookRegistry::new(),
    );
    let result = controller
        .load(&LoadRequest {
            config_id: Some(BOARD_ID.to_string()),
            hide_empty_lanes: false,
            selection,
        })
        .await;
    (client, controller, result)
}

#[tokio::test]
async fn given_views_and_forms_requested_when_loaded_then_board_fetched_once_with_them() {
    let (client, controller, result) = load_selecting(
        board_config(true),
        SelectionRequest {
            view: Some("v-all".to_string()),
            form: Some("f-compact".to_string()),
            secondary_view: Some("v-tasks".to_string()),
            secondary_form: Some("f-task".to_string()),
        },
    )
    .await;

    assert_that!(result, ok(anything()));
    let queries = client.queries_of("incident").await;
    assert_that!(queries.len(), eq(1));
    assert!(queries[0].attributes.iter().any(|a| a == "description"));
    assert_that!(client.queries_of("task").await.len(), eq(1));
    let state = controller.state().await;
    assert_that!(state.published_ticket, eq(1));
    assert_that!(
        state.selection.primary_view.as_ref().map(|v| v.id.as_str()),
        some(eq("v-all"))
    );
    assert_that!(
        state.selection.primary_form.as_ref().map(|f| f.id.as_str()),
        some(eq("f-compact"))
    );
    assert_that!(
        state.selection.secondary_form.as_ref().map(|f| f.id.as_str()),
        some(eq("f-task"))
    );
}

#[tokio::test]
async fn given_unknown_view_requested_when_loaded_then_not_found_and_nothing_fetched() {
    let (client, _, result) = load_selecting(
        board_config(false),
        SelectionRequest {
            view: Some("v-missing".to_string()),
            ..SelectionRequest::default()
        },
    )
    .await;

    assert!(matches!(result, Err(BoardError::NotFound { .. })));
    assert!(client.queries_of("incident").await.is_empty());
}

#[tokio::test]
async fn given_secondary_view_requested_without_secondary_entity_when_loaded_then_configuration_error() {
    let (_, _, result) = load_selecting(
        board_config(false),
        SelectionRequest {
            secondary_view: Some("v-tasks".to_string()),
            ..SelectionRequest::default()
        },
    )
    .await;

    assert!(matches!(result, Err(BoardError::Configuration { .. })));
}
