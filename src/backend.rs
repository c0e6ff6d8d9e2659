//! Backend access: the seven fixed endpoints and the HTTP client behind them.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::logging::FetchScope;
use crate::session::StudyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Scorecard,
    Study(StudyId),
    HighRisk,
    Benchmarks,
    Heatmap,
    HeatmapInsight,
    CraEmail(StudyId),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Scorecard => "/scorecard".to_string(),
            Endpoint::Study(id) => format!("/study/{}", id),
            Endpoint::HighRisk => "/highrisk".to_string(),
            Endpoint::Benchmarks => "/benchmarks".to_string(),
            Endpoint::Heatmap => "/heatmap".to_string(),
            Endpoint::HeatmapInsight => "/heatmap-ai".to_string(),
            Endpoint::CraEmail(id) => format!("/cra-email/{}", id),
        }
    }
}

/// Status and body of a completed request, before any JSON decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (connect, DNS, read failure).
    Transport(String),
    /// Non-200 status; the raw body is kept for display.
    Status { status: u16, body: String },
    /// 200 response whose body is not JSON.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "request failed: {}", msg),
            FetchError::Status { status, body } if body.trim().is_empty() => {
                write!(f, "Server Error {}", status)
            }
            FetchError::Status { status, body } => {
                write!(f, "Server Error {}: {}", status, body.trim())
            }
            FetchError::Decode(msg) => write!(f, "invalid JSON from backend: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Issue a GET for `endpoint` and return status + body. Only transport
    /// failures are errors here; any HTTP status is a response.
    async fn get(&self, endpoint: Endpoint) -> Result<RawResponse, FetchError>;

    /// GET and decode as JSON, treating any status other than 200 as an error.
    async fn get_json(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let resp = self.get(endpoint).await?;
        if !resp.is_ok() {
            return Err(FetchError::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        serde_json::from_str(&resp.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(cfg: &DashboardConfig) -> Self {
        // No timeout: a slow backend blocks the interaction until it answers.
        Self {
            client: Client::new(),
            base: cfg.base_url.clone(),
        }
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base, endpoint.path())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, endpoint: Endpoint) -> Result<RawResponse, FetchError> {
        let path = endpoint.path();
        let mut scope = FetchScope::new(&path);

        let resp = match self.client.get(self.url_for(endpoint)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                scope.fail();
                return Err(FetchError::Transport(e.to_string()));
            }
        };
        let status = resp.status().as_u16();
        scope.status(status);
        let body = resp.text().await.map_err(|e| {
            scope.fail();
            FetchError::Transport(format!("read body failed: {}", e))
        })?;
        Ok(RawResponse { status, body })
    }
}
