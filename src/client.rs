//! HTTP probe client routed through the proxy under test

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use url::Url;

use crate::{
    defaults,
    error::{error_chain, AppError, Result},
};

/// Probe request configuration
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: String,
    pub proxy: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ProbeRequest {
    /// Create a new probe request through the given proxy
    pub fn new<S: Into<String>>(url: S, proxy: Url) -> Self {
        Self {
            url: url.into(),
            proxy,
            timeout: Duration::from_secs(defaults::DEFAULT_HANDSHAKE_TIMEOUT_SECS),
            user_agent: defaults::PROBE_USER_AGENT.to_string(),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Probe response with timing information.
///
/// `elapsed` is measured inside the client around the full request and body
/// read, so pipelines driven by a scripted client reproduce the exact same
/// narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body_size: usize,
    pub elapsed: Duration,
}

impl ProbeResponse {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Elapsed time in whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Probe client trait for abstraction and testing
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Execute a GET through the proxy, reading the full response body
    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeResponse>;
}

/// Probe client sending real traffic through the gateway under test
#[derive(Debug, Default)]
pub struct GatewayProbeClient;

impl GatewayProbeClient {
    /// Create a new gateway probe client
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProbeClient for GatewayProbeClient {
    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeResponse> {
        let proxy = Proxy::all(request.proxy.clone())
            .map_err(|e| AppError::parse(format!("Invalid proxy target: {}", error_chain(&e))))?;

        // Installing an explicit proxy also turns off environment proxy
        // detection, so the probe never leaks onto a system-configured route.
        let client = Client::builder()
            .proxy(proxy)
            .user_agent(&request.user_agent)
            .build()
            .map_err(|e| {
                AppError::probe(format!("Failed to create HTTP client: {}", error_chain(&e)))
            })?;

        let started = Instant::now();
        let response = client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let elapsed = started.elapsed();

        Ok(ProbeResponse {
            status,
            body_size: body.len(),
            elapsed,
        })
    }
}
