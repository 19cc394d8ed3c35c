//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use proxy_sentinel::{
    error::{AppError, Result},
    ProbeClient, ProbeRequest, ProbeResponse,
};

/// Scripted outcome for one probe URL.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// 200 response with the given body size after the given elapsed time
    Success { body_size: usize, elapsed: Duration },
    /// Gateway cannot be reached from the agent network
    Unreachable,
    /// Proxy accepted the connection but never delivered in time
    Timeout,
    /// Any other probe failure, reported verbatim
    Probe(String),
}

/// Probe client replaying scripted outcomes keyed by URL.
///
/// Panics on a URL no outcome was scripted for, which doubles as an
/// assertion that the pipeline only talks to its fixed probe targets.
pub struct ScriptedProbe {
    outcomes: HashMap<String, Outcome>,
    requests: Mutex<Vec<ProbeRequest>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on<S: Into<String>>(mut self, url: S, outcome: Outcome) -> Self {
        self.outcomes.insert(url.into(), outcome);
        self
    }

    pub fn succeed<S: Into<String>>(self, url: S, elapsed_ms: u64, body_size: usize) -> Self {
        self.on(
            url,
            Outcome::Success {
                body_size,
                elapsed: Duration::from_millis(elapsed_ms),
            },
        )
    }

    /// Requests the pipeline issued, in order.
    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProbeClient for ScriptedProbe {
    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.outcomes.get(&request.url) {
            Some(Outcome::Success { body_size, elapsed }) => Ok(ProbeResponse {
                status: 200,
                body_size: *body_size,
                elapsed: *elapsed,
            }),
            Some(Outcome::Unreachable) => Err(AppError::unreachable(format!(
                "tcp connect error: Connection refused (os error 111) while reaching {}",
                request.proxy
            ))),
            Some(Outcome::Timeout) => Err(AppError::timeout(format!(
                "operation timed out after {:?}",
                request.timeout
            ))),
            Some(Outcome::Probe(message)) => Err(AppError::probe(message.clone())),
            None => panic!("no scripted outcome for {}", request.url),
        }
    }
}
