//! HTTP transport for the portal API
//!
//! Every portal endpoint is a POST that answers with JSON. [`Transport`] is
//! the seam between the login/usage logic and the network: production code
//! uses [`HttpTransport`] (reqwest), tests substitute a scripted fake.

use async_trait::async_trait;
use kcwater_core::error::{KcWaterError, Result};
use serde_json::Value;
use tracing::debug;

/// Body of an API request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
    /// JSON document
    Json(Value),
}

/// A POST request to one portal endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    /// Create a form-encoded request
    pub fn form<K, V>(url: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Form(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Create a JSON request
    pub fn json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends API requests and decodes JSON responses
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the decoded JSON body
    ///
    /// Non-success statuses are reported as [`KcWaterError::HttpStatus`];
    /// connection and decoding failures as [`KcWaterError::Network`].
    async fn post(&self, request: ApiRequest) -> Result<Value>;
}

/// reqwest-backed transport
///
/// Uses reqwest's default timeouts; nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: ApiRequest) -> Result<Value> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder.send().await?;
        let status = response.status();
        debug!("POST {} -> {}", request.url, status);

        if !status.is_success() {
            return Err(KcWaterError::HttpStatus {
                status: status.as_u16(),
                url: request.url,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
