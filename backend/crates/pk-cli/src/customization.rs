use pk_board::{BoardError, BoardResult, CustomizationLoader};

use async_trait::async_trait;
use log::debug;
use reqwest::Client as ReqwestClient;

/// Checks that the board's customization web resource can be fetched.
///
/// Transition hooks themselves are compiled into the binary; a board whose
/// script is gone still fails to open, as it would in the browser.
pub struct WebResourceLoader {
    org_url: String,
    access_token: Option<String>,
    client: ReqwestClient,
}

impl WebResourceLoader {
    pub fn new(org_url: &str, access_token: Option<&str>) -> Self {
        Self {
            org_url: org_url.trim().trim_end_matches('/').to_string(),
            access_token: access_token.map(String::from),
            client: ReqwestClient::new(),
        }
    }

    /// Absolute URLs are used as is; anything else is relative to the organisation.
    pub fn resolve(&self, url: &str) -> String {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.org_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl CustomizationLoader for WebResourceLoader {
    async fn load(&self, url: &str) -> BoardResult<()> {
        let target = self.resolve(url);
        let mut req = self.client.get(&target);
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| BoardError::data_access("load customization", e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::data_access(
                "load customization",
                format!("{target} returned {status}"),
            ));
        }

        debug!("Customization {target} is available");
        Ok(())
    }
}
