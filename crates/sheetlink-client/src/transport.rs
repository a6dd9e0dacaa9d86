use reqwest::Url;
use serde_json::Value;
use std::future::Future;

use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

/// Which Google API a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    Sheets,
    Drive,
}

/// A single REST call, described independently of any HTTP library.
///
/// `path` holds raw (unencoded) segments; the transport is responsible for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub api: Api,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, api: Api, path: &[&str]) -> Self {
        Self {
            method,
            api,
            path: path.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends API requests and returns the decoded JSON body
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// reqwest-backed transport that attaches the bearer token to every call
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let base = match request.api {
            Api::Sheets => &self.config.sheets_base_url,
            Api::Drive => &self.config.drive_base_url,
        };

        let mut url = Url::parse(base).map_err(|e| ClientError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("cannot append path to {}", base)))?
            .pop_if_empty()
            .extend(&request.path);
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.url(&request)?;
        tracing::debug!(method = ?request.method, %url, "sending request");

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        let mut builder = builder
            .bearer_auth(&self.config.access_token)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "request failed");
            return Err(ClientError::from_response(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
