//! Network access abstraction
//!
//! Provides a trait for performing the network leg of a fetch so the
//! cache manager can run against a real origin (ureq), a disconnected
//! network, or a scripted test double.

use crate::error::{SwError, SwResult};
use crate::fetch::request::{Method, Request};
use crate::fetch::response::Response;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Abstract network interface
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request against the network.
    ///
    /// Any HTTP status is a successful fetch; only transport failures
    /// (offline, DNS, refused connection, timeout) are errors.
    async fn fetch(&self, request: &Request) -> SwResult<Response>;

    /// Human-readable name for logs
    fn name(&self) -> &'static str;
}

/// Network backed by a blocking ureq agent, run on the tokio blocking pool
#[derive(Clone)]
pub struct HttpNetwork {
    agent: ureq::Agent,
    body_limit: u64,
}

impl HttpNetwork {
    /// Create a network client with a global per-request timeout
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            body_limit: u64::MAX,
        }
    }

    /// Cap response bodies at `bytes`; larger bodies fail the fetch.
    /// Bodies are unbounded by default.
    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }

    fn fetch_blocking(agent: &ureq::Agent, request: &Request, limit: u64) -> SwResult<Response> {
        let url = request.url.as_str();
        let mut response = match request.method {
            Method::Get => {
                let mut builder = agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Head => {
                let mut builder = agent.head(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            other => return Err(SwError::InvalidMethod(other.to_string())),
        }
        .map_err(|e| SwError::network(url, e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = if request.method == Method::Head {
            Vec::new()
        } else {
            response
                .body_mut()
                .with_config()
                .limit(limit)
                .read_to_vec()
                .map_err(|e| SwError::network(url, format!("reading body: {}", e)))?
        };

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.into(),
        })
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        debug!("{} {}", request.method, request.url);
        let agent = self.agent.clone();
        let request = request.clone();
        let limit = self.body_limit;
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &request, limit))
            .await
            .map_err(|e| SwError::Task(format!("network task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Network that is permanently unreachable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetwork;

#[async_trait]
impl Network for OfflineNetwork {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        debug!("Offline, refusing {} {}", request.method, request.url);
        Err(SwError::Offline)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
