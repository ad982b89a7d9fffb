use pk_core::{AttributeSchema, BoardLane, Record};

use log::warn;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionOptions {
    /// Leave out option lanes without records. Boolean lanes are always kept.
    pub hide_empty_lanes: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanePartition {
    pub lanes: Vec<BoardLane>,
    /// Records whose discriminator matched no option.
    pub orphaned: usize,
}

enum Placement {
    Lane(usize),
    Unmatched,
    Orphaned,
}

/// Group records into lanes in option order.
///
/// Records keep their input order within a lane. Records without a value go to
/// a single unmatched lane appended at the end; records with a value that no
/// option carries are dropped with a warning.
pub fn partition(
    records: Vec<Record>,
    schema: &AttributeSchema,
    options: PartitionOptions,
) -> LanePartition {
    let mut lanes: Vec<BoardLane> = schema.options.iter().cloned().map(BoardLane::new).collect();
    let mut unmatched = BoardLane::unmatched();
    let mut orphaned = 0;

    for record in records {
        let value = record.get(&schema.logical_name);
        let placement = if schema.is_boolean() {
            Placement::Lane(usize::from(boolean_value(value)))
        } else {
            place_option(schema, value)
        };

        match placement {
            Placement::Lane(index) => lanes[index].data.push(record),
            Placement::Unmatched => unmatched.data.push(record),
            Placement::Orphaned => {
                orphaned += 1;
                warn!(
                    "Record with {} = {} matches no option of {}.{}; was the option set reorganised?",
                    schema.logical_name,
                    value.map_or_else(|| "null".to_string(), Value::to_string),
                    schema.entity,
                    schema.logical_name
                );
            }
        }
    }

    if options.hide_empty_lanes && !schema.is_boolean() {
        lanes.retain(|lane| !lane.is_empty());
    }

    if !unmatched.is_empty() {
        lanes.push(unmatched);
    }

    LanePartition { lanes, orphaned }
}

/// Drop targets a card in `source` may be moved to.
pub fn drop_targets(schema: &AttributeSchema, source: Option<i32>) -> Vec<i32> {
    let source_option = source.and_then(|s| schema.option(s));
    schema
        .options
        .iter()
        .map(|o| o.value)
        .filter(|target| Some(*target) != source)
        .filter(|target| source_option.is_none_or(|s| s.allows_move_to(*target)))
        .collect()
}

fn place_option(schema: &AttributeSchema, value: Option<&Value>) -> Placement {
    let number = match value {
        None | Some(Value::Null) => return Placement::Unmatched,
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    let Some(number) = number.and_then(|n| i32::try_from(n).ok()) else {
        return Placement::Orphaned;
    };

    match schema.options.iter().position(|o| o.value == number) {
        Some(index) => Placement::Lane(index),
        None if number == 0 => Placement::Unmatched,
        None => Placement::Orphaned,
    }
}

/// Index 0 is the false lane. Absent values count as false.
fn boolean_value(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    }
}
