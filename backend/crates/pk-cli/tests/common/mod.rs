#![allow(dead_code)]

use pk_cli::WebApiClient;
use pk_config::ApiConfig;

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const API: &str = "/api/data/v9.0";
pub const USER: &str = "9a1b2c3d-0000-0000-0000-000000000001";

pub fn api_path(rest: &str) -> String {
    format!("{API}/{rest}")
}

pub fn api_config(server: &MockServer, user_id: Option<&str>) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        api_version: "9.0".to_string(),
        access_token: Some("token-123".to_string()),
        user_id: user_id.map(String::from),
        timeout_secs: 5,
    }
}

pub fn client(server: &MockServer) -> WebApiClient {
    WebApiClient::new(&api_config(server, Some(USER))).unwrap()
}

/// Answers metadata requests for `incident` so entity set lookups resolve.
pub async fn mount_incident_metadata(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path("EntityDefinitions(LogicalName='incident')")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LogicalName": "incident",
            "PrimaryIdAttribute": "incidentid",
            "PrimaryNameAttribute": "title",
            "EntitySetName": "incidents",
            "Attributes": [
                {
                    "LogicalName": "statuscode",
                    "AttributeType": "Status",
                    "DisplayName": { "UserLocalizedLabel": { "Label": "Status Reason", "LanguageCode": 1033 } }
                },
                {
                    "LogicalName": "title",
                    "AttributeType": "String",
                    "DisplayName": { "UserLocalizedLabel": { "Label": "Case Title", "LanguageCode": 1033 } }
                }
            ]
        })))
        .mount(server)
        .await;
}
