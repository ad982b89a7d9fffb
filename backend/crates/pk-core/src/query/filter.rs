use crate::models::record::Record;
use crate::query::condition::Condition;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    And,
    Or,
}

impl FilterType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    pub filter_type: FilterType,
    pub conditions: Vec<Condition>,
    pub filters: Vec<Filter>,
}

impl Filter {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            filter_type: FilterType::And,
            conditions,
            filters: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.iter().all(Filter::is_empty)
    }

    pub fn matches(&self, record: &Record, user_id: Option<&str>) -> bool {
        let mut results = self
            .conditions
            .iter()
            .map(|c| c.matches(record, user_id))
            .chain(
                self.filters
                    .iter()
                    .filter(|f| !f.is_empty())
                    .map(|f| f.matches(record, user_id)),
            )
            .peekable();

        if results.peek().is_none() {
            return true;
        }

        match self.filter_type {
            FilterType::And => results.all(|r| r),
            FilterType::Or => results.any(|r| r),
        }
    }
}
