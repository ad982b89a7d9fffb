//! Turns a view's query into the board's data query.

use pk_core::{Condition, ConditionOperator, FetchQuery, Filter, FilterType, NIL_ID};

/// What the board needs from a fetch on top of the view's own definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub id_attribute: String,
    pub card_fields: Vec<String>,
    pub swim_lane: String,
    pub extra_fields: Vec<String>,
    /// ANDed onto the view's filter.
    pub conditions: Vec<Condition>,
}

impl QueryPlan {
    pub fn new(id_attribute: &str, card_fields: &[String], swim_lane: &str) -> Self {
        Self {
            id_attribute: id_attribute.to_string(),
            card_fields: card_fields.to_vec(),
            swim_lane: swim_lane.to_string(),
            extra_fields: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn with_extra_field(mut self, field: &str) -> Self {
        self.extra_fields.push(field.to_string());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// Restrict `attribute` to `ids`. No ids restricts it to a placeholder that matches nothing.
pub fn scope_to(attribute: &str, ids: &[String]) -> Condition {
    Condition::in_values(attribute, ids.to_vec())
}

pub fn translate(base: &FetchQuery, plan: &QueryPlan) -> FetchQuery {
    let mut attributes: Vec<String> = Vec::new();
    let requested = std::iter::once(&plan.id_attribute)
        .chain(plan.card_fields.iter())
        .chain(std::iter::once(&plan.swim_lane))
        .chain(plan.extra_fields.iter());

    for field in requested {
        // Aliased columns belong to link-entities and are requested there.
        if field.is_empty() || field.contains('.') {
            continue;
        }
        if !attributes.iter().any(|a| a.eq_ignore_ascii_case(field)) {
            attributes.push(field.clone());
        }
    }

    let conditions: Vec<Condition> = plan.conditions.iter().map(guard_empty_list).collect();

    let filter = match (&base.filter, conditions.is_empty()) {
        (base_filter, true) => base_filter.clone(),
        (None, false) => Some(Filter::and(conditions)),
        (Some(base_filter), false) => Some(Filter {
            filter_type: FilterType::And,
            conditions,
            filters: vec![base_filter.clone()],
        }),
    };

    FetchQuery {
        entity: base.entity.clone(),
        attributes,
        all_attributes: false,
        orders: base.orders.clone(),
        filter,
        link_entities: base.link_entities.clone(),
        distinct: base.distinct,
        top: base.top,
    }
}

fn guard_empty_list(condition: &Condition) -> Condition {
    let mut condition = condition.clone();
    if condition.operator == ConditionOperator::In && condition.values.is_empty() {
        condition.values.push(NIL_ID.to_string());
    }
    condition
}
