use crate::BoardResult;

use pk_core::{EntityReference, Record};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordFormOptions {
    pub use_quick_create_form: bool,
    pub open_in_new_window: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlyOutFieldKind {
    Text,
    Number,
    Textarea,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlyOutField {
    pub name: String,
    pub label: String,
    pub kind: FlyOutFieldKind,
    pub required: bool,
    pub subtext: Option<String>,
}

impl FlyOutField {
    pub fn new(name: &str, label: &str, kind: FlyOutFieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            subtext: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_subtext(mut self, subtext: &str) -> Self {
        self.subtext = Some(subtext.to_string());
        self
    }
}

/// A small input form a transition hook asks the user to fill in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlyOutForm {
    pub title: String,
    pub fields: Vec<FlyOutField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlyOutResult {
    pub cancelled: bool,
    pub values: Record,
}

impl FlyOutResult {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            values: Record::new(),
        }
    }

    pub fn submitted(values: Record) -> Self {
        Self {
            cancelled: false,
            values,
        }
    }
}

/// Host-native forms: the record editor and hook fly-outs.
#[async_trait]
pub trait FormHost: Send + Sync {
    /// Open the record editor. Returns the saved record, or `None` when nothing was saved.
    async fn open_record_form(
        &self,
        entity: &str,
        id: Option<&str>,
        options: &RecordFormOptions,
    ) -> BoardResult<Option<EntityReference>>;

    async fn show_form(&self, form: &FlyOutForm) -> BoardResult<FlyOutResult>;
}
