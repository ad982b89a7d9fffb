use crate::xml;

use log::warn;
use serde::{Deserialize, Serialize};

/// One allowed lane-to-lane move, keyed by option values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Transition {
    pub source: i32,
    pub to: i32,
}

/// Decode an option's encoded transition data.
///
/// `None` means the option carries no restriction. Entries whose ids are not
/// integers are skipped; a document that cannot be read at all is treated as
/// carrying no restriction.
pub fn parse_transition_data(data: Option<&str>) -> Option<Vec<Transition>> {
    let data = data?.trim();
    if data.is_empty() {
        return None;
    }

    let root = match xml::parse(data) {
        Ok(root) => root,
        Err(e) => {
            warn!("Ignoring unreadable transition data: {e}");
            return None;
        }
    };

    let mut elements = root.descendants_named("allowedtransition");
    if root.name == "allowedtransition" {
        elements.insert(0, &root);
    }

    let transitions = elements
        .into_iter()
        .filter_map(|element| {
            let source = element.attribute("sourcestatusid")?.trim().parse().ok();
            let to = element.attribute("tostatusid")?.trim().parse().ok();

            match (source, to) {
                (Some(source), Some(to)) => Some(Transition { source, to }),
                _ => {
                    warn!("Skipping malformed allowed transition entry {:?}", element.attributes);
                    None
                }
            }
        })
        .collect();

    Some(transitions)
}
