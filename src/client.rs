// src/client.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use reqwest::Method;

/// The HTTP collaborator the entity hierarchy drives.
///
/// Implementations prefix relative paths with a configured base endpoint,
/// send and expect JSON, and map the response status per [`map_response`]:
/// 200/201 give the parsed body, 204 gives an empty-string sentinel, and
/// anything else fails with [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value>;

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(Method::PUT, path, body).await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(Method::PATCH, path, body).await
    }

    async fn delete(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(Method::DELETE, path, body).await
    }
}

#[derive(Clone)]
pub struct PdnsClient {
    http: Client,
    api_endpoint: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
}

impl PdnsClient {
    pub fn new(api_endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_endpoint: api_endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Same as [`PdnsClient::new`] with a per-request timeout.
    pub fn with_timeout(
        api_endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_endpoint: api_endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn url(&self, path: &str) -> String {
        // Absolute URLs pass through untouched, as the API returns some.
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.api_endpoint, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for PdnsClient {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.url(path);
        info!("request: {} {}", method, url);

        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if !self.api_key.is_empty() {
            req = req.header("X-API-Key", &self.api_key);
        }

        let body = body.unwrap_or_else(|| json!({}));
        let res = req.json(&body).send().await?;
        let status = res.status().as_u16();
        let text = res.text().await?;
        debug!("response {}: {}", status, text);

        map_response(&url, status, &text)
    }
}

/// Map an HTTP outcome to the parsed body or a transport error.
pub(crate) fn map_response(url: &str, status: u16, body: &str) -> Result<Value> {
    match status {
        200 | 201 => Ok(serde_json::from_str(body)?),
        204 => Ok(Value::String(String::new())),
        404 => Err(Error::Transport {
            url: url.to_string(),
            status_code: 404,
            message: "Not found".to_string(),
        }),
        _ => Err(Error::Transport {
            url: url.to_string(),
            status_code: status,
            message: error_message(body),
        }),
    }
}

/// Extract the API error message from a response body. The API reports
/// either an `error` string or an `errors` list; a body that is not error
/// JSON is passed through verbatim.
fn error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match parsed.get("error").or_else(|| parsed.get("errors")) {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => "No error message found".to_string(),
    }
}

/// The API answers some mutations with an empty body (or the 204
/// sentinel); callers treat those as "nothing was created".
pub(crate) fn is_empty_response(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
