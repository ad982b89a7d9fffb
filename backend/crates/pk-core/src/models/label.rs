use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedLabel {
    #[serde(rename = "Label", default)]
    pub label: String,
    #[serde(rename = "LanguageCode", default)]
    pub language_code: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelCollection {
    #[serde(rename = "LocalizedLabels", default)]
    pub localized_labels: Vec<LocalizedLabel>,
    #[serde(rename = "UserLocalizedLabel", default)]
    pub user_localized_label: Option<LocalizedLabel>,
}

impl LabelCollection {
    pub fn from_text(label: &str) -> Self {
        let localized = LocalizedLabel {
            label: label.to_string(),
            language_code: 1033,
        };
        Self {
            localized_labels: vec![localized.clone()],
            user_localized_label: Some(localized),
        }
    }

    /// The user's label, falling back to the first localized one.
    pub fn text(&self) -> &str {
        self.user_localized_label
            .as_ref()
            .or_else(|| self.localized_labels.first())
            .map_or("", |l| l.label.as_str())
    }
}
