use crate::{CliClientResult, ClientError};

use pk_board::{BoardResult, DataClient, OptionSetDefinition};
use pk_config::ApiConfig;
use pk_core::{
    AttributeKind, BoardConfigSummary, CardForm, EntityMetadata, FetchQuery, PicklistOption,
    Record, SavedView, normalize_id,
};

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::RwLock;

const MORE_RECORDS: &str = "@Microsoft.Dynamics.CRM.morerecords";
const CONFIG_NAME_MARKER: &str = "d365powerkanban.config.json";
const CARD_FORM_TYPE: i32 = 11;

#[derive(Deserialize)]
struct Collection<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct OptionSetResponse {
    #[serde(rename = "OptionSet")]
    option_set: OptionSetBody,
}

#[derive(Deserialize)]
struct OptionSetBody {
    #[serde(rename = "Options", default)]
    options: Vec<PicklistOption>,
    #[serde(rename = "TrueOption", default)]
    true_option: Option<PicklistOption>,
    #[serde(rename = "FalseOption", default)]
    false_option: Option<PicklistOption>,
}

/// HTTP client for the host's OData Web API
pub struct WebApiClient {
    /// `<base>/api/data/v<version>/`
    pub data_url: String,
    pub user_id: Option<String>,
    access_token: Option<String>,
    client: ReqwestClient,
    set_names: RwLock<HashMap<String, String>>,
}

impl WebApiClient {
    pub fn new(config: &ApiConfig) -> CliClientResult<Self> {
        let client = ReqwestClient::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            data_url: config.data_url(),
            user_id: config.user_id.clone(),
            access_token: config.access_token.clone(),
            client,
            set_names: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> CliClientResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.data_url, path))
            .map_err(|e| ClientError::response(format!("invalid url for {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Build a request with the OData headers
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, url)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .header("Prefer", "odata.include-annotations=\"*\"");

        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Send and turn non-success statuses into `ClientError::Api`
    async fn send(&self, req: RequestBuilder) -> CliClientResult<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let error = body.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error"))
            .to_string();
        Err(ClientError::api_error(status.as_u16(), code, message))
    }

    /// Send and read the body as JSON. Empty bodies read as `null`.
    async fn send_json(&self, req: RequestBuilder) -> CliClientResult<Value> {
        let response = self.send(req).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> CliClientResult<T> {
        let url = self.url(path, query)?;
        let body = self.send_json(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn who_am_i(&self) -> CliClientResult<String> {
        if let Some(user_id) = &self.user_id {
            return Ok(user_id.clone());
        }

        let body: Value = self.get("WhoAmI", &[]).await?;
        body.get("UserId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::response("WhoAmI returned no UserId"))
    }

    async fn entity_metadata(&self, entity: &str) -> CliClientResult<EntityMetadata> {
        let metadata: EntityMetadata = self
            .get(
                &format!("EntityDefinitions(LogicalName='{entity}')"),
                &[
                    (
                        "$select",
                        "LogicalName,PrimaryIdAttribute,PrimaryNameAttribute,EntitySetName",
                    ),
                    (
                        "$expand",
                        "Attributes($select=LogicalName,AttributeType,DisplayName)",
                    ),
                ],
            )
            .await?;

        self.set_names
            .write()
            .await
            .insert(entity.to_string(), metadata.set_name().to_string());
        Ok(metadata)
    }

    /// Entity set name of `entity`, looked up once.
    async fn entity_set(&self, entity: &str) -> CliClientResult<String> {
        if let Some(set) = self.set_names.read().await.get(entity) {
            return Ok(set.clone());
        }
        Ok(self.entity_metadata(entity).await?.set_name().to_string())
    }

    async fn option_set(
        &self,
        entity: &str,
        attribute: &str,
        kind: AttributeKind,
    ) -> CliClientResult<OptionSetDefinition> {
        let path = format!(
            "EntityDefinitions(LogicalName='{entity}')/Attributes(LogicalName='{attribute}')/{}",
            kind.metadata_type()
        );
        let response: OptionSetResponse = self
            .get(&path, &[("$select", "LogicalName"), ("$expand", "OptionSet")])
            .await?;
        let body = response.option_set;

        match (kind, body.false_option, body.true_option) {
            (AttributeKind::Boolean, Some(false_option), Some(true_option)) => {
                Ok(OptionSetDefinition::TwoOptions {
                    false_option,
                    true_option,
                })
            }
            (AttributeKind::Boolean, _, _) => Err(ClientError::response(format!(
                "{entity}.{attribute} has no two-option set"
            ))),
            _ => Ok(OptionSetDefinition::Options(body.options)),
        }
    }

    /// Every page of a FetchXML query.
    async fn fetch_all(&self, query: &FetchQuery) -> CliClientResult<Vec<Record>> {
        let set = self.entity_set(&query.entity).await?;
        let fetch_xml = query.to_fetch_xml();

        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let paged = if query.top.is_some() {
                fetch_xml.clone()
            } else {
                with_page(&fetch_xml, page)
            };
            let body: Value = self.get(&set, &[("fetchXml", paged.as_str())]).await?;

            let rows = body
                .get("value")
                .and_then(Value::as_array)
                .ok_or_else(|| ClientError::response(format!("{set} returned no value array")))?;
            records.extend(rows.iter().filter_map(|row| row.as_object().cloned()));

            let more = body.get(MORE_RECORDS).and_then(Value::as_bool).unwrap_or(false);
            if !more || query.top.is_some() {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} {} record(s) in {page} page(s)", records.len(), query.entity);
        Ok(records)
    }

    async fn record(&self, entity: &str, id: &str, columns: &[String]) -> CliClientResult<Record> {
        let set = self.entity_set(entity).await?;
        let select = columns.join(",");
        let query: Vec<(&str, &str)> = if select.is_empty() {
            Vec::new()
        } else {
            vec![("$select", select.as_str())]
        };
        self.get(&format!("{set}({})", normalize_id(id)), &query).await
    }

    async fn create_record(&self, entity: &str, fields: Record) -> CliClientResult<String> {
        let set = self.entity_set(entity).await?;
        let url = self.url(&set, &[])?;
        let response = self
            .send(self.request(Method::POST, url).json(&fields))
            .await?;

        response
            .headers()
            .get("OData-EntityId")
            .and_then(|h| h.to_str().ok())
            .and_then(entity_id_from_uri)
            .ok_or_else(|| ClientError::response(format!("create of {entity} returned no id")))
    }

    async fn patch(&self, path: &str, fields: &Value) -> CliClientResult<()> {
        let url = self.url(path, &[])?;
        self.send_json(self.request(Method::PATCH, url).json(fields))
            .await
            .map(|_| ())
    }
}

/// Request page `page` of a FetchXML query.
pub(crate) fn with_page(fetch_xml: &str, page: u32) -> String {
    fetch_xml.replacen("<fetch ", &format!("<fetch page=\"{page}\" "), 1)
}

/// Id out of an `OData-EntityId` header such as `.../incidents(<id>)`.
pub fn entity_id_from_uri(uri: &str) -> Option<String> {
    let start = uri.rfind('(')?;
    let end = uri.rfind(')')?;
    (end > start + 1).then(|| normalize_id(&uri[start + 1..end]))
}

#[async_trait]
impl DataClient for WebApiClient {
    async fn current_user_id(&self) -> BoardResult<String> {
        self.who_am_i().await.map_err(|e| e.into_board("WhoAmI"))
    }

    async fn retrieve_entity_metadata(&self, entity: &str) -> BoardResult<EntityMetadata> {
        self.entity_metadata(entity)
            .await
            .map_err(|e| e.into_board("retrieve entity metadata"))
    }

    async fn retrieve_option_set(
        &self,
        entity: &str,
        attribute: &str,
        kind: AttributeKind,
    ) -> BoardResult<OptionSetDefinition> {
        self.option_set(entity, attribute, kind)
            .await
            .map_err(|e| e.into_board("retrieve option set"))
    }

    async fn retrieve_multiple(&self, query: &FetchQuery) -> BoardResult<Vec<Record>> {
        self.fetch_all(query)
            .await
            .map_err(|e| e.into_board("retrieve multiple"))
    }

    async fn retrieve_record(
        &self,
        entity: &str,
        id: &str,
        columns: &[String],
    ) -> BoardResult<Record> {
        self.record(entity, id, columns)
            .await
            .map_err(|e| e.into_board("retrieve record"))
    }

    async fn retrieve_saved_views(&self, entity: &str) -> BoardResult<Vec<SavedView>> {
        let filter = format!("returnedtypecode eq '{entity}' and querytype eq 0");
        self.get::<Collection<SavedView>>(
            "savedqueries",
            &[
                ("$select", "layoutxml,fetchxml,savedqueryid,name"),
                ("$filter", filter.as_str()),
            ],
        )
        .await
        .map(|c| c.value)
        .map_err(|e| e.into_board("retrieve saved views"))
    }

    async fn retrieve_card_forms(&self, entity: &str) -> BoardResult<Vec<CardForm>> {
        let filter = format!("objecttypecode eq '{entity}' and type eq {CARD_FORM_TYPE}");
        self.get::<Collection<CardForm>>(
            "systemforms",
            &[("$select", "formid,formxml,name"), ("$filter", filter.as_str())],
        )
        .await
        .map(|c| c.value)
        .map_err(|e| e.into_board("retrieve card forms"))
    }

    async fn retrieve_board_configuration(&self, config_id: &str) -> BoardResult<String> {
        let body: Value = self
            .get(
                &format!("webresourceset({})", normalize_id(config_id)),
                &[("$select", "content")],
            )
            .await
            .map_err(|e| e.into_board("retrieve board configuration"))?;

        body.get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::response(format!("board configuration {config_id} has no content"))
                    .into_board("retrieve board configuration")
            })
    }

    async fn list_board_configurations(&self) -> BoardResult<Vec<BoardConfigSummary>> {
        let filter = format!("contains(name, '{CONFIG_NAME_MARKER}')");
        self.get::<Collection<BoardConfigSummary>>(
            "webresourceset",
            &[
                ("$select", "name,displayname,webresourceid"),
                ("$filter", filter.as_str()),
                ("$orderby", "displayname"),
            ],
        )
        .await
        .map(|c| c.value)
        .map_err(|e| e.into_board("list board configurations"))
    }

    async fn retrieve_default_board_id(&self, user_id: &str) -> BoardResult<Option<String>> {
        let body: Value = self
            .get(
                &format!("systemusers({})", normalize_id(user_id)),
                &[("$select", "oss_defaultboardid")],
            )
            .await
            .map_err(|e| e.into_board("retrieve default board"))?;

        Ok(body
            .get("oss_defaultboardid")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string))
    }

    async fn set_default_board_id(&self, user_id: &str, config_id: &str) -> BoardResult<()> {
        self.patch(
            &format!("systemusers({})", normalize_id(user_id)),
            &json!({ "oss_defaultboardid": config_id }),
        )
        .await
        .map_err(|e| e.into_board("set default board"))
    }

    async fn create(&self, entity: &str, fields: Record) -> BoardResult<String> {
        self.create_record(entity, fields)
            .await
            .map_err(|e| e.into_board("create"))
    }

    async fn update(&self, entity: &str, id: &str, fields: Record) -> BoardResult<()> {
        let result = async {
            let set = self.entity_set(entity).await?;
            self.patch(&format!("{set}({})", normalize_id(id)), &Value::Object(fields))
                .await
        };
        result.await.map_err(|e| e.into_board("update"))
    }

    async fn delete(&self, entity: &str, id: &str) -> BoardResult<()> {
        let result = async {
            let set = self.entity_set(entity).await?;
            let url = self.url(&format!("{set}({})", normalize_id(id)), &[])?;
            self.send(self.request(Method::DELETE, url)).await.map(|_| ())
        };
        result.await.map_err(|e| e.into_board("delete"))
    }

    async fn execute(&self, action: &str, payload: Value) -> BoardResult<Value> {
        let result = async {
            let url = self.url(action, &[])?;
            self.send_json(self.request(Method::POST, url).json(&payload))
                .await
        };
        result.await.map_err(|e| e.into_board(action))
    }
}
