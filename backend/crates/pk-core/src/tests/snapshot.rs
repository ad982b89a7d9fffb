use crate::{BoardLane, BoardSnapshot, PicklistOption, Record, SecondaryLanes};

use serde_json::json;

fn row(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn snapshot() -> BoardSnapshot {
    let mut new = BoardLane::new(PicklistOption::new(1, 0, "New"));
    new.data.push(row(json!({"incidentid": "{A1}", "title": "first"})));
    let mut done = BoardLane::new(PicklistOption::new(5, 1, "Done"));
    done.data.push(row(json!({"incidentid": "b2", "title": "second"})));

    let mut open_tasks = BoardLane::new(PicklistOption::new(2, 0, "Open"));
    open_tasks.data.push(row(json!({"activityid": "t1", "_regardingobjectid_value": "A1"})));
    open_tasks.data.push(row(json!({"activityid": "t2", "_regardingobjectid_value": "b2"})));

    BoardSnapshot {
        primary: vec![new, done, BoardLane::unmatched()],
        secondary: Some(SecondaryLanes {
            parent_lookup: "regardingobjectid".to_string(),
            lanes: vec![open_tasks],
        }),
    }
}

#[test]
fn given_snapshot_when_record_ids_then_lane_order() {
    let snapshot = snapshot();

    assert_eq!(snapshot.record_count(), 2);
    assert_eq!(snapshot.record_ids("incidentid"), vec!["a1", "b2"]);
}

#[test]
fn given_braced_id_when_find_record_then_lane_is_returned() {
    let snapshot = snapshot();

    let (lane, record) = snapshot.find_record("{B2}", "incidentid").unwrap();

    assert_eq!(lane.value(), Some(5));
    assert_eq!(record["title"], json!("second"));
}

#[test]
fn given_parent_when_secondary_for_parent_then_only_its_children() {
    let lanes = snapshot().secondary_for_parent("A1");

    assert_eq!(lanes.len(), 1);
    assert_eq!(lanes[0].data.len(), 1);
    assert_eq!(lanes[0].data[0]["activityid"], json!("t1"));
}
