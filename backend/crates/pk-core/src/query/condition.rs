use crate::models::record::{Record, field_text, normalize_id};

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionOperator {
    Eq,
    Ne,
    In,
    NotIn,
    Null,
    NotNull,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    EqUserId,
    NeUserId,
    /// Anything else FetchXML supports; kept verbatim and not evaluated locally.
    Other(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::In => "in",
            Self::NotIn => "not-in",
            Self::Null => "null",
            Self::NotNull => "not-null",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Like => "like",
            Self::EqUserId => "eq-userid",
            Self::NeUserId => "ne-userid",
            Self::Other(op) => op,
        }
    }

    fn is_multi_value(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl FromStr for ConditionOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => Self::Eq,
            "ne" | "neq" => Self::Ne,
            "in" => Self::In,
            "not-in" => Self::NotIn,
            "null" => Self::Null,
            "not-null" => Self::NotNull,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            "like" => Self::Like,
            "eq-userid" => Self::EqUserId,
            "ne-userid" => Self::NeUserId,
            other => Self::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub values: Vec<String>,
    /// Alias of a linked entity the condition applies to.
    pub entity_name: Option<String>,
}

impl Condition {
    pub fn new(attribute: &str, operator: ConditionOperator, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator,
            values,
            entity_name: None,
        }
    }

    pub fn eq(attribute: &str, value: &str) -> Self {
        Self::new(attribute, ConditionOperator::Eq, vec![value.to_string()])
    }

    pub fn in_values(attribute: &str, values: Vec<String>) -> Self {
        Self::new(attribute, ConditionOperator::In, values)
    }

    pub fn is_multi_value(&self) -> bool {
        self.operator.is_multi_value()
    }

    /// Evaluate against a raw record. Lookup attributes may appear as `_<name>_value`.
    pub fn matches(&self, record: &Record, user_id: Option<&str>) -> bool {
        if self.entity_name.is_some() {
            return true;
        }

        let field = record
            .get(&self.attribute)
            .or_else(|| record.get(&format!("_{}_value", self.attribute)))
            .filter(|v| !v.is_null());

        match &self.operator {
            ConditionOperator::Null => field.is_none(),
            ConditionOperator::NotNull => field.is_some(),
            ConditionOperator::Eq => field.is_some_and(|v| self.values.iter().any(|e| equals(v, e))),
            ConditionOperator::Ne => !field.is_some_and(|v| self.values.iter().any(|e| equals(v, e))),
            ConditionOperator::In => field.is_some_and(|v| self.values.iter().any(|e| equals(v, e))),
            ConditionOperator::NotIn => {
                !field.is_some_and(|v| self.values.iter().any(|e| equals(v, e)))
            }
            ConditionOperator::Gt => self.compares(field, |o| o == Ordering::Greater),
            ConditionOperator::Ge => self.compares(field, |o| o != Ordering::Less),
            ConditionOperator::Lt => self.compares(field, |o| o == Ordering::Less),
            ConditionOperator::Le => self.compares(field, |o| o != Ordering::Greater),
            ConditionOperator::Like => field.is_some_and(|v| {
                self.values
                    .first()
                    .is_some_and(|pattern| like(&field_text(v), pattern))
            }),
            ConditionOperator::EqUserId => match user_id {
                Some(user) => field.is_some_and(|v| equals(v, user)),
                None => true,
            },
            ConditionOperator::NeUserId => match user_id {
                Some(user) => !field.is_some_and(|v| equals(v, user)),
                None => true,
            },
            ConditionOperator::Other(_) => true,
        }
    }

    fn compares(&self, field: Option<&Value>, accept: impl Fn(Ordering) -> bool) -> bool {
        let (Some(value), Some(expected)) = (field, self.values.first()) else {
            return false;
        };

        match (value.as_f64(), expected.parse::<f64>().ok()) {
            (Some(actual), Some(expected)) => actual.partial_cmp(&expected).is_some_and(accept),
            _ => accept(field_text(value).as_str().cmp(expected.as_str())),
        }
    }
}

fn equals(value: &Value, expected: &str) -> bool {
    match value {
        Value::Number(n) => expected
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(e, a)| (e - a).abs() < f64::EPSILON),
        Value::Bool(b) => match expected {
            "1" | "true" => *b,
            "0" | "false" => !*b,
            _ => false,
        },
        Value::String(s) => normalize_id(s) == normalize_id(expected),
        _ => false,
    }
}

/// SQL-style `like` with `%` wildcards, case-insensitive.
fn like(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();

    if parts.len() == 1 {
        return text == pattern;
    }

    let mut rest = text.as_str();
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if index == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if index == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(at) => rest = &rest[at + part.len()..],
                None => return false,
            }
        }
    }
    true
}
