//! Staged diagnostic pipeline
//!
//! One invocation walks a fixed sequence of stages against the submitted
//! proxy: announce, handshake/latency, optional 1 MiB download, verdict.
//! Every human-visible line is pushed into an [`EventSink`] in stage order.
//! Probe failures never escape a run; they are converted into a two-line
//! fault report on the same sink.

pub mod verdict;

pub use verdict::Verdict;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    client::{ProbeClient, ProbeRequest},
    config::PipelineConfig,
    defaults,
    error::Result,
    events::{EventSink, LogColor, LogEvent},
};

/// Client-submitted diagnostic request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    /// Proxy endpoint as `host:port`, optionally prefixed with `user:pass@`
    pub proxy: String,
    /// Claimed vantage point of the proxy
    pub location: String,
}

impl TestRequest {
    /// Create a new test request
    pub fn new<P: Into<String>, L: Into<String>>(proxy: P, location: L) -> Self {
        Self {
            proxy: proxy.into(),
            location: location.into(),
        }
    }

    /// Gateway display form of the proxy endpoint.
    ///
    /// Credentials are stripped: everything after the first `@` when one is
    /// present, the whole endpoint otherwise.
    pub fn gateway(&self) -> &str {
        match self.proxy.split_once('@') {
            Some((_, gateway)) => gateway,
            None => &self.proxy,
        }
    }

    /// Proxy routing target handed to the probe client.
    ///
    /// The endpoint is not validated up front; a malformed value fails here
    /// and surfaces through the regular failure path.
    pub fn proxy_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}", self.proxy))?)
    }
}

/// Per-invocation measurement state.
///
/// Owned by a single run and dropped when it finishes; nothing carries over
/// between runs.
#[derive(Debug, Clone)]
pub struct ProbeSession {
    pub started_at: DateTime<Utc>,
    pub latency_ms: Option<u64>,
    pub mbps: Option<f64>,
}

impl ProbeSession {
    fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            latency_ms: None,
            mbps: None,
        }
    }
}

/// Staged diagnostic pipeline
pub struct DiagnosticPipeline {
    client: Arc<dyn ProbeClient>,
    config: PipelineConfig,
}

impl DiagnosticPipeline {
    /// Create a new pipeline over the given probe client
    pub fn new(client: Arc<dyn ProbeClient>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Run one diagnostic session, pushing narration into `sink`.
    ///
    /// Never fails from the caller's point of view: a probe error aborts the
    /// remaining stages and is reported on the sink as an error line followed
    /// by a fault attribution line. Events emitted before the failure stay
    /// delivered.
    pub async fn run(&self, request: &TestRequest, sink: &dyn EventSink) {
        let mut session = ProbeSession::begin();

        match self.execute(request, sink, &mut session).await {
            Ok(verdict) => {
                info!(
                    verdict = verdict.category(),
                    latency_ms = session.latency_ms,
                    mbps = session.mbps,
                    started_at = %session.started_at,
                    "diagnostic run completed"
                );
            }
            Err(error) => {
                warn!(
                    category = error.category(),
                    fault = error.fault().label(),
                    "diagnostic run failed: {}",
                    error
                );
                sink.emit(LogEvent::alert(format!(
                    "!!! ERROR: {}",
                    error.report_message()
                )));
                sink.emit(LogEvent::alert(format!(
                    "DIAGNOSTIC FAULT: {}",
                    error.fault()
                )));
            }
        }
    }

    async fn execute(
        &self,
        request: &TestRequest,
        sink: &dyn EventSink,
        session: &mut ProbeSession,
    ) -> Result<Verdict> {
        // Build the routing target before announcing anything, matching the
        // failure behavior for malformed endpoints.
        let proxy = request.proxy_url()?;

        sink.emit(LogEvent::plain(format!(
            "INITIATING REAL-TIME TRAFFIC ANALYSIS FROM {}...",
            request.location.to_uppercase()
        )));
        sink.emit(LogEvent::plain(format!(
            "TARGET GATEWAY: {}",
            request.gateway()
        )));

        let latency_ms = self.handshake_stage(&proxy, sink).await?;
        session.latency_ms = Some(latency_ms);

        if self.config.download_stage {
            let mbps = self.download_stage(&proxy, sink).await?;
            session.mbps = Some(mbps);
        }

        let verdict = Verdict::classify(latency_ms, session.mbps, &self.config.rules);
        sink.emit(LogEvent::muted(defaults::VERDICT_SEPARATOR));
        for event in verdict.events(&request.location) {
            sink.emit(event);
        }
        sink.emit(LogEvent::muted(defaults::VERDICT_SEPARATOR));

        Ok(verdict)
    }

    /// Establish an HTTPS connection through the proxy and measure latency
    async fn handshake_stage(&self, proxy: &Url, sink: &dyn EventSink) -> Result<u64> {
        sink.emit(LogEvent::info("TESTING HANDSHAKE & SSL NEGOTIATION..."));

        let request = ProbeRequest::new(defaults::HANDSHAKE_PROBE_URL, proxy.clone())
            .with_timeout(self.config.handshake_timeout());
        let response = self.client.fetch(request).await?;

        let latency_ms = response.elapsed_ms();
        debug!(latency_ms, status = response.status, "handshake probe completed");

        sink.emit(LogEvent::plain("SUCCESS: Connection established via Proxy."));
        let color = if latency_ms > self.config.latency_caution_ms {
            LogColor::Warn
        } else {
            LogColor::Ok
        };
        sink.emit(LogEvent::with_color(
            format!("REAL LATENCY: {}ms", latency_ms),
            color,
        ));

        Ok(latency_ms)
    }

    /// Pull the fixed 1 MiB payload through the proxy and measure throughput
    async fn download_stage(&self, proxy: &Url, sink: &dyn EventSink) -> Result<f64> {
        sink.emit(LogEvent::info("INITIATING 1MB DOWNLOAD TEST THROUGH NODE..."));

        let request = ProbeRequest::new(defaults::DOWNLOAD_PROBE_URL, proxy.clone())
            .with_timeout(self.config.download_timeout());
        let response = self.client.fetch(request).await?;

        let mbps = compute_mbps(response.body_size, response.elapsed);
        debug!(mbps, bytes = response.body_size, "download probe completed");

        let color = if mbps < self.config.throughput_caution_mbps {
            LogColor::Warn
        } else {
            LogColor::Ok
        };
        sink.emit(LogEvent::with_color(
            format!("DOWNLOAD SPEED: {:.2} Mbps", mbps),
            color,
        ));

        Ok(mbps)
    }
}

/// Throughput in Mbps from measured bytes over elapsed time, rounded to two
/// decimals.
///
/// The rounded value is what gets displayed and what the verdict rules
/// compare against, so the narrated number and the classification always
/// agree. A zero elapsed time yields infinity rather than a panic.
pub fn compute_mbps(body_size: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return f64::INFINITY;
    }
    let mbps = (body_size as f64 * 8.0) / secs / 1_000_000.0;
    (mbps * 100.0).round() / 100.0
}
