use pk_board::{
    BoardError, BoardResult, DataClient, FlyOutField, FlyOutFieldKind, FlyOutForm, FlyOutResult,
    FormHost, RecordFormOptions,
};
use pk_core::{EntityReference, Record, normalize_id};

use std::sync::Arc;

use async_trait::async_trait;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use log::info;
use serde_json::Value;

/// Record forms and fly-outs as terminal prompts.
pub struct TerminalFormHost {
    client: Arc<dyn DataClient>,
    org_url: String,
}

impl TerminalFormHost {
    pub fn new(client: Arc<dyn DataClient>, org_url: &str) -> Self {
        Self {
            client,
            org_url: org_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Browser address of a record's main form.
    pub fn record_url(&self, entity: &str, id: &str) -> String {
        format!(
            "{}/main.aspx?etn={entity}&id={}&pagetype=entityrecord",
            self.org_url,
            normalize_id(id)
        )
    }
}

/// Read one fly-out answer. Blank optional input is `None`.
pub fn field_value(field: &FlyOutField, input: &str) -> Result<Option<Value>, String> {
    let input = input.trim();
    if input.is_empty() {
        return if field.required {
            Err(format!("{} is required", field.label))
        } else {
            Ok(None)
        };
    }

    match field.kind {
        FlyOutFieldKind::Number => {
            if let Ok(whole) = input.parse::<i64>() {
                return Ok(Some(Value::from(whole)));
            }
            input
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| format!("{} must be a number", field.label))
        }
        FlyOutFieldKind::Text | FlyOutFieldKind::Textarea => {
            Ok(Some(Value::String(input.to_string())))
        }
    }
}

fn prompt_failed(error: impl std::fmt::Display) -> BoardError {
    BoardError::data_access("terminal prompt", error.to_string())
}

async fn ask(field: FlyOutField, prompt: String) -> BoardResult<Option<Value>> {
    tokio::task::spawn_blocking(move || {
        let checked = field.clone();
        let answer = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .validate_with(move |input: &String| field_value(&checked, input).map(|_| ()))
            .interact_text()
            .map_err(prompt_failed)?;
        field_value(&field, &answer).map_err(prompt_failed)
    })
    .await
    .map_err(prompt_failed)?
}

async fn confirm(prompt: String) -> BoardResult<bool> {
    tokio::task::spawn_blocking(move || {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(prompt_failed)
    })
    .await
    .map_err(prompt_failed)?
}

#[async_trait]
impl FormHost for TerminalFormHost {
    async fn open_record_form(
        &self,
        entity: &str,
        id: Option<&str>,
        options: &RecordFormOptions,
    ) -> BoardResult<Option<EntityReference>> {
        if let Some(id) = id {
            info!("Open {} to edit the record", self.record_url(entity, id));
            return Ok(None);
        }

        let metadata = self.client.retrieve_entity_metadata(entity).await?;
        let Some(name_attribute) = metadata.primary_name_attribute.clone() else {
            return Err(BoardError::configuration(format!(
                "{entity} has no primary name attribute to create records with"
            )));
        };

        let field = FlyOutField::new(
            &name_attribute,
            metadata.display_name_of(&name_attribute),
            FlyOutFieldKind::Text,
        );
        let form = if options.use_quick_create_form {
            "quick create"
        } else {
            "new record"
        };
        let prompt = format!("{} ({form} {entity}, blank to cancel)", field.label);
        let Some(value) = ask(field, prompt).await? else {
            return Ok(None);
        };

        let mut fields = Record::new();
        fields.insert(name_attribute, value);
        let id = self.client.create(entity, fields).await?;
        Ok(Some(EntityReference::new(entity, &id)))
    }

    async fn show_form(&self, form: &FlyOutForm) -> BoardResult<FlyOutResult> {
        let mut values = Record::new();
        for field in &form.fields {
            let prompt = match &field.subtext {
                Some(subtext) => format!("{}: {} ({subtext})", form.title, field.label),
                None => format!("{}: {}", form.title, field.label),
            };
            if let Some(value) = ask(field.clone(), prompt).await? {
                values.insert(field.name.clone(), value);
            }
        }

        if confirm(format!("Submit {}?", form.title)).await? {
            Ok(FlyOutResult::submitted(values))
        } else {
            Ok(FlyOutResult::cancelled())
        }
    }
}
