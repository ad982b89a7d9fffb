use crate::CoreResult;
use crate::xml::{self, XmlElement};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldLabel {
    pub label: String,
    pub lcid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardCell {
    pub field: String,
    pub labels: Vec<FieldLabel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRow {
    pub cells: Vec<CardCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardSegment {
    pub rows: Vec<CardRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedCard {
    pub header: CardSegment,
    pub body: CardSegment,
    pub footer: CardSegment,
}

impl ParsedCard {
    /// Every bound field, header first, without duplicates.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for segment in [&self.header, &self.body, &self.footer] {
            for cell in segment.rows.iter().flat_map(|r| r.cells.iter()) {
                if !fields.contains(&cell.field) {
                    fields.push(cell.field.clone());
                }
            }
        }
        fields
    }
}

/// A card layout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardForm {
    #[serde(rename = "formid")]
    pub id: String,
    pub name: String,
    #[serde(rename = "formxml")]
    pub form_xml: String,
    #[serde(skip)]
    pub parsed: ParsedCard,
}

impl CardForm {
    pub fn parse(mut self) -> CoreResult<Self> {
        self.parsed = parse_card_form(&self.form_xml)?;
        Ok(self)
    }
}

pub fn parse_card_form(form_xml: &str) -> CoreResult<ParsedCard> {
    let root = xml::parse(form_xml)?;
    let sections = root.descendants_named("section");
    let segment = |name: &str| {
        sections
            .iter()
            .find(|s| s.attribute("name") == Some(name))
            .map(|s| parse_segment(s))
            .unwrap_or_default()
    };

    Ok(ParsedCard {
        header: segment("CardHeader"),
        body: segment("CardDetails"),
        footer: segment("CardFooter"),
    })
}

fn parse_segment(section: &XmlElement) -> CardSegment {
    let rows = section
        .descendants_named("row")
        .into_iter()
        .map(|row| CardRow {
            cells: row
                .descendants_named("cell")
                .into_iter()
                .filter_map(parse_cell)
                .collect(),
        })
        .collect();

    CardSegment { rows }
}

fn parse_cell(cell: &XmlElement) -> Option<CardCell> {
    let control = cell.descendants_named("control").into_iter().next()?;
    let field = control.attribute("datafieldname")?.to_string();

    let labels = cell
        .child("labels")
        .map(|labels| {
            labels
                .children_named("label")
                .map(|l| FieldLabel {
                    label: l.attribute("description").unwrap_or_default().to_string(),
                    lcid: l.attribute("languagecode").unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(CardCell { field, labels })
}
