//! Proxy Sentinel
//!
//! A real-time proxy diagnostic server. Clients submit a forward proxy
//! endpoint and a claimed vantage-point label over a WebSocket event
//! channel; the server probes handshake latency and download throughput
//! through that proxy, streams narration back line by line, and closes
//! each run with a categorized verdict.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use client::{GatewayProbeClient, ProbeClient, ProbeRequest, ProbeResponse};
pub use config::{Config, PipelineConfig, ServerConfig, VerdictRules};
pub use error::{AppError, Fault, Result};
pub use events::{
    ChannelSink, ClientEvent, EventSink, FanoutSink, LogColor, LogEvent, MemorySink, ServerEvent,
    TerminalEcho,
};
pub use pipeline::{DiagnosticPipeline, ProbeSession, TestRequest, Verdict};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values and fixed probe targets
pub mod defaults {
    /// Well-known HTTPS endpoint used by the handshake/latency stage
    pub const HANDSHAKE_PROBE_URL: &str = "https://www.google.com";

    /// Fixed 1 MiB payload endpoint used by the throughput stage
    pub const DOWNLOAD_PROBE_URL: &str = "https://httpbin.org/bytes/1048576";

    /// Advertised size of the throughput payload in bytes
    pub const DOWNLOAD_PROBE_BYTES: usize = 1_048_576;

    /// User agent presented by every probe
    pub const PROBE_USER_AGENT: &str = "Mozilla/5.0 ProAgent/1.0";

    /// Separator framing the verdict block
    pub const VERDICT_SEPARATOR: &str =
        "-----------------------------------------------";

    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_PUBLIC_DIR: &str = "public";
    pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

    /// Upper bounds shared by the CLI parsers and config validation
    pub const MAX_HANDSHAKE_TIMEOUT_SECS: u64 = 300;
    pub const MAX_DOWNLOAD_TIMEOUT_SECS: u64 = 600;
    pub const DEFAULT_LATENCY_CAUTION_MS: u64 = 1000;
    pub const DEFAULT_THROUGHPUT_CAUTION_MBPS: f64 = 2.0;
    pub const DEFAULT_DEPLETED_MBPS: f64 = 1.5;
    pub const DEFAULT_CONGESTED_MS: u64 = 1500;
    pub const DEFAULT_DISTANT_MS: u64 = 800;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
