use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;

use crate::error::SearchError;

/// Transport seam between the controller and the search backend. Production
/// code uses [`HttpTransport`]; tests substitute in-process fakes.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// GET a search path with flat query parameters
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, SearchError>;

    /// POST a JSON body (multi-search)
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SearchError>;
}

/// HTTP transport over the search REST API
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Value, SearchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(SearchError::Backend {
                status: status.as_u16(),
                message: backend_message(status, body.as_ref()),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(self.url(path))
            .query(params)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::check(response).await
    }
}

/// Error text for a non-2xx response: the body's `message` field when the
/// backend sent one, else the HTTP status reason.
fn backend_message(status: StatusCode, body: Option<&Value>) -> String {
    body.and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
