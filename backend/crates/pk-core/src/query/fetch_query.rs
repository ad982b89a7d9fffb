//! Structured form of a FetchXML query.

use crate::models::record::Record;
use crate::query::condition::{Condition, ConditionOperator};
use crate::query::filter::{Filter, FilterType};
use crate::xml::{self, XmlElement, escape};
use crate::{CoreError, CoreResult};

use std::fmt::Write;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderClause {
    pub attribute: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkEntity {
    pub name: String,
    pub from: String,
    pub to: String,
    pub alias: Option<String>,
    pub link_type: Option<String>,
    pub attributes: Vec<String>,
    pub all_attributes: bool,
    pub orders: Vec<OrderClause>,
    pub filter: Option<Filter>,
    pub link_entities: Vec<LinkEntity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchQuery {
    pub entity: String,
    pub attributes: Vec<String>,
    pub all_attributes: bool,
    pub orders: Vec<OrderClause>,
    pub filter: Option<Filter>,
    pub link_entities: Vec<LinkEntity>,
    pub distinct: bool,
    pub top: Option<u32>,
}

impl FetchQuery {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = attributes.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order(mut self, attribute: &str, descending: bool) -> Self {
        self.orders.push(OrderClause {
            attribute: attribute.to_string(),
            descending,
        });
        self
    }

    #[track_caller]
    pub fn parse(fetch_xml: &str) -> CoreResult<Self> {
        let root = xml::parse(fetch_xml)?;
        if root.name != "fetch" {
            return Err(CoreError::xml(format!(
                "expected <fetch> root, found <{}>",
                root.name
            )));
        }

        let entity = root
            .child("entity")
            .ok_or_else(|| CoreError::xml("<fetch> has no <entity>"))?;
        let name = entity
            .attribute("name")
            .ok_or_else(|| CoreError::xml("<entity> has no name"))?;

        Ok(Self {
            entity: name.to_string(),
            attributes: parse_attribute_names(entity),
            all_attributes: entity.child("all-attributes").is_some(),
            orders: parse_orders(entity),
            filter: parse_filters(entity),
            link_entities: parse_link_entities(entity)?,
            distinct: root.attribute("distinct") == Some("true"),
            top: root
                .attribute("top")
                .or_else(|| root.attribute("count"))
                .and_then(|t| t.parse().ok()),
        })
    }

    /// Render as FetchXML. Output is deterministic for a given query.
    pub fn to_fetch_xml(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<fetch version=\"1.0\" mapping=\"logical\" distinct=\"{}\"",
            self.distinct
        );
        if let Some(top) = self.top {
            let _ = write!(out, " top=\"{top}\"");
        }
        let _ = write!(out, "><entity name=\"{}\">", escape(&self.entity));
        write_body(
            &mut out,
            &self.attributes,
            self.all_attributes,
            &self.orders,
            self.filter.as_ref(),
            &self.link_entities,
        );
        out.push_str("</entity></fetch>");
        out
    }

    /// Evaluate the root filter against a record. Link-entity filters are not evaluated.
    pub fn matches(&self, record: &Record, user_id: Option<&str>) -> bool {
        self.filter
            .as_ref()
            .is_none_or(|f| f.matches(record, user_id))
    }
}

fn parse_attribute_names(element: &XmlElement) -> Vec<String> {
    element
        .children_named("attribute")
        .filter_map(|a| a.attribute("name").map(str::to_string))
        .collect()
}

fn parse_orders(element: &XmlElement) -> Vec<OrderClause> {
    element
        .children_named("order")
        .filter_map(|o| {
            o.attribute("attribute").map(|attribute| OrderClause {
                attribute: attribute.to_string(),
                descending: o.attribute("descending") == Some("true"),
            })
        })
        .collect()
}

/// Several sibling `<filter>` elements are combined with `and`.
fn parse_filters(element: &XmlElement) -> Option<Filter> {
    let mut filters: Vec<Filter> = element.children_named("filter").map(parse_filter).collect();
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter {
            filter_type: FilterType::And,
            conditions: Vec::new(),
            filters,
        }),
    }
}

fn parse_filter(element: &XmlElement) -> Filter {
    let filter_type = match element.attribute("type") {
        Some("or") => FilterType::Or,
        _ => FilterType::And,
    };

    Filter {
        filter_type,
        conditions: element.children_named("condition").map(parse_condition).collect(),
        filters: element.children_named("filter").map(parse_filter).collect(),
    }
}

fn parse_condition(element: &XmlElement) -> Condition {
    let operator: ConditionOperator = element
        .attribute("operator")
        .unwrap_or("eq")
        .parse()
        .unwrap_or(ConditionOperator::Eq);

    let mut values: Vec<String> = element.attribute("value").map(str::to_string).into_iter().collect();
    values.extend(element.children_named("value").map(|v| v.text.trim().to_string()));

    Condition {
        attribute: element.attribute("attribute").unwrap_or_default().to_string(),
        operator,
        values,
        entity_name: element.attribute("entityname").map(str::to_string),
    }
}

#[track_caller]
fn parse_link_entities(element: &XmlElement) -> CoreResult<Vec<LinkEntity>> {
    element
        .children_named("link-entity")
        .map(|link| {
            let name = link
                .attribute("name")
                .ok_or_else(|| CoreError::xml("<link-entity> has no name"))?;
            Ok(LinkEntity {
                name: name.to_string(),
                from: link.attribute("from").unwrap_or_default().to_string(),
                to: link.attribute("to").unwrap_or_default().to_string(),
                alias: link.attribute("alias").map(str::to_string),
                link_type: link.attribute("link-type").map(str::to_string),
                attributes: parse_attribute_names(link),
                all_attributes: link.child("all-attributes").is_some(),
                orders: parse_orders(link),
                filter: parse_filters(link),
                link_entities: parse_link_entities(link)?,
            })
        })
        .collect()
}

fn write_body(
    out: &mut String,
    attributes: &[String],
    all_attributes: bool,
    orders: &[OrderClause],
    filter: Option<&Filter>,
    link_entities: &[LinkEntity],
) {
    if all_attributes {
        out.push_str("<all-attributes />");
    }
    for attribute in attributes {
        let _ = write!(out, "<attribute name=\"{}\" />", escape(attribute));
    }
    for order in orders {
        let _ = write!(
            out,
            "<order attribute=\"{}\" descending=\"{}\" />",
            escape(&order.attribute),
            order.descending
        );
    }
    if let Some(filter) = filter {
        write_filter(out, filter);
    }
    for link in link_entities {
        let _ = write!(
            out,
            "<link-entity name=\"{}\" from=\"{}\" to=\"{}\"",
            escape(&link.name),
            escape(&link.from),
            escape(&link.to)
        );
        if let Some(alias) = &link.alias {
            let _ = write!(out, " alias=\"{}\"", escape(alias));
        }
        if let Some(link_type) = &link.link_type {
            let _ = write!(out, " link-type=\"{}\"", escape(link_type));
        }
        out.push('>');
        write_body(
            out,
            &link.attributes,
            link.all_attributes,
            &link.orders,
            link.filter.as_ref(),
            &link.link_entities,
        );
        out.push_str("</link-entity>");
    }
}

fn write_filter(out: &mut String, filter: &Filter) {
    let _ = write!(out, "<filter type=\"{}\">", filter.filter_type.as_str());
    for condition in &filter.conditions {
        let _ = write!(
            out,
            "<condition attribute=\"{}\" operator=\"{}\"",
            escape(&condition.attribute),
            escape(condition.operator.as_str())
        );
        if let Some(entity_name) = &condition.entity_name {
            let _ = write!(out, " entityname=\"{}\"", escape(entity_name));
        }
        match condition.values.as_slice() {
            [] => out.push_str(" />"),
            [single] if !condition.is_multi_value() => {
                let _ = write!(out, " value=\"{}\" />", escape(single));
            }
            values => {
                out.push('>');
                for value in values {
                    let _ = write!(out, "<value>{}</value>", escape(value));
                }
                out.push_str("</condition>");
            }
        }
    }
    for nested in &filter.filters {
        write_filter(out, nested);
    }
    out.push_str("</filter>");
}
