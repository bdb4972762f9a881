use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),
    #[error("upstream responded with HTTP {status}")]
    Status { status: u16, body: String },
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    NoData(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_connect() {
            UpstreamError::Unreachable(err.to_string())
        } else {
            UpstreamError::RequestFailed(err)
        }
    }
}

/// A single outbound GET against a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[cfg(test)]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Transport used by every data source. Implementations return the decoded
/// JSON body of a 2xx response and an error for anything else.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get_json(&self, request: UpstreamRequest) -> Result<Value, UpstreamError>;
}

pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    /// The overall request deadline is enforced per source by the fetch
    /// wrapper; the client only bounds connection setup.
    pub fn new(connect_timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent("OceanCareInitiative/1.0")
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                url = %request.url,
                status = status.as_u16(),
                "upstream returned error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
