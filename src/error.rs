//! Error handling for the proxy diagnostic server

use std::fmt;

use thiserror::Error;

/// Custom error types for the proxy diagnostic server
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The proxy gateway could not be reached from this host
    #[error("Proxy gateway unreachable: {0}")]
    Unreachable(String),

    /// A probe exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Probe requests that failed for any other reason
    #[error("Probe error: {0}")]
    Probe(String),

    /// Event channel transport errors
    #[error("Event channel error: {0}")]
    Channel(String),

    /// I/O errors (socket binding, file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),
}

/// Fault attribution reported to the client at the end of a failed run.
///
/// Only failures to reach the gateway at all are pinned on the client's
/// network; everything else, timeouts included, is attributed to the
/// proxy side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    ClientSide,
    ServerSide,
}

impl Fault {
    /// Label used verbatim in the diagnostic fault report line
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClientSide => "CLIENT-SIDE ISSUE",
            Self::ServerSide => "SERVER-SIDE ISSUE",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed report text for gateway-unreachable failures
pub const UNREACHABLE_REPORT: &str = "Agent local network cannot reach the Proxy Gateway.";

/// Fixed report text for probe timeouts
pub const TIMEOUT_REPORT: &str = "Node Timeout: The proxy server failed to deliver data in time.";

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new gateway-unreachable error
    pub fn unreachable<S: Into<String>>(message: S) -> Self {
        Self::Unreachable(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new probe error
    pub fn probe<S: Into<String>>(message: S) -> Self {
        Self::Probe(message.into())
    }

    /// Create a new event channel error
    pub fn channel<S: Into<String>>(message: S) -> Self {
        Self::Channel(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Classify a probe failure from its rendered error chain.
    ///
    /// Used for failures where the transport library did not expose a
    /// structured cause: connection refusals and DNS lookup failures mean
    /// the gateway was never reached, deadline wording means a timeout,
    /// anything else stays a plain probe error.
    pub fn classify_probe_failure<S: Into<String>>(detail: S) -> Self {
        let detail = detail.into();
        let lower = detail.to_ascii_lowercase();
        if lower.contains("connection refused")
            || lower.contains("dns error")
            || lower.contains("failed to lookup address")
            || lower.contains("name or service not known")
        {
            Self::Unreachable(detail)
        } else if lower.contains("timed out") || lower.contains("timeout") {
            Self::Timeout(detail)
        } else {
            Self::Probe(detail)
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Parse(_) => "PARSE",
            Self::Unreachable(_) => "UNREACHABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Probe(_) => "PROBE",
            Self::Channel(_) => "CHANNEL",
            Self::Io(_) => "IO",
        }
    }

    /// Which side of the proxy link this failure is attributed to
    pub fn fault(&self) -> Fault {
        match self {
            Self::Unreachable(_) => Fault::ClientSide,
            _ => Fault::ServerSide,
        }
    }

    /// Message for the client-facing error report.
    ///
    /// Unreachable-gateway and timeout failures get fixed wording; every
    /// other failure reports its own message verbatim.
    pub fn report_message(&self) -> String {
        match self {
            Self::Unreachable(_) => UNREACHABLE_REPORT.to_string(),
            Self::Timeout(_) => TIMEOUT_REPORT.to_string(),
            Self::Config(msg)
            | Self::Parse(msg)
            | Self::Probe(msg)
            | Self::Channel(msg)
            | Self::Io(msg) => msg.clone(),
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1, // Invalid configuration/usage
            Self::Unreachable(_) | Self::Probe(_) => 2, // Network issues
            Self::Timeout(_) => 3,                 // Timeout issues
            Self::Io(_) => 5,                      // I/O issues
            Self::Channel(_) => 6,                 // Event channel issues
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Unreachable(_) | Self::Probe(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Channel(_) | Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

/// Render an error and its source chain as a single line
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<axum::Error> for AppError {
    fn from(error: axum::Error) -> Self {
        Self::channel(error_chain(&error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let detail = error_chain(&error);
        if error.is_timeout() {
            return Self::Timeout(detail);
        }

        // Prefer structured io causes over wording when the transport
        // exposes them.
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                match io.kind() {
                    std::io::ErrorKind::ConnectionRefused => return Self::Unreachable(detail),
                    std::io::ErrorKind::TimedOut => return Self::Timeout(detail),
                    _ => {}
                }
            }
            source = cause.source();
        }

        Self::classify_probe_failure(detail)
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
