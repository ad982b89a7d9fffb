//! Minimal reader for the attribute-centric XML documents the host stores
//! (FetchXML, layout XML, card form XML, transition data).
//!
//! Only elements, attributes and plain text are understood. Comments,
//! processing instructions and CDATA-free text are all the host ever emits.

use crate::{CoreError, CoreResult};

use std::sync::LazyLock;

use regex::{Captures, Regex};

static IGNORED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<\?.*?\?>").unwrap());

static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(lt|gt|quot|apos|amp|#[xX][0-9A-Fa-f]+|#[0-9]+);").unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z_][\w.:-]*)((?:\s+[\w.:-]+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*(/?)>"#)
        .unwrap()
});

static ATTRIBUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w.:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All descendants (depth first, document order) with the given name.
    pub fn descendants_named(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }
}

/// Parse a document and return its root element.
#[track_caller]
pub fn parse(document: &str) -> CoreResult<XmlElement> {
    let cleaned = IGNORED_REGEX.replace_all(document, "");
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut cursor = 0;

    for captures in TAG_REGEX.captures_iter(&cleaned) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        let between = &cleaned[cursor..whole.start()];
        if between.contains('<') || between.contains('>') {
            return Err(CoreError::xml(format!(
                "unexpected markup near '{}'",
                between.trim()
            )));
        }
        if let Some(current) = stack.last_mut() {
            current.text.push_str(&unescape(between));
        } else if !between.trim().is_empty() {
            return Err(CoreError::xml("text outside of the root element"));
        }
        cursor = whole.end();

        let closing = !captures[1].is_empty();
        let name = captures[2].to_string();
        let self_closing = !captures[4].is_empty();

        if closing {
            let element = stack
                .pop()
                .ok_or_else(|| CoreError::xml(format!("unexpected closing tag </{name}>")))?;
            if element.name != name {
                return Err(CoreError::xml(format!(
                    "mismatched closing tag </{name}>, expected </{}>",
                    element.name
                )));
            }
            attach(&mut stack, &mut root, element)?;
            continue;
        }

        let element = XmlElement {
            name,
            attributes: parse_attributes(&captures[3]),
            children: Vec::new(),
            text: String::new(),
        };

        if self_closing {
            attach(&mut stack, &mut root, element)?;
        } else {
            stack.push(element);
        }
    }

    if !cleaned[cursor..].trim().is_empty() {
        return Err(CoreError::xml("trailing content after the root element"));
    }

    if let Some(open) = stack.last() {
        return Err(CoreError::xml(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| CoreError::xml("document has no root element"))
}

#[track_caller]
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> CoreResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(CoreError::xml("document has more than one root element")),
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE_REGEX
        .captures_iter(raw)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            (c[1].to_string(), unescape(value))
        })
        .collect()
}

pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Decode the predefined entities and numeric character references.
/// References that name no valid character are left as written.
pub fn unescape(value: &str) -> String {
    ENTITY_REGEX
        .replace_all(value, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => name[1..].parse::<u32>().ok(),
                }
                .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
