//! Log events streamed over the diagnostic event channel
//!
//! The pipeline narrates its progress as a sequence of [`LogEvent`]s. Sinks
//! decide where those events go: over the WebSocket to the browser console,
//! mirrored to the server terminal, or captured in memory for tests.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::pipeline::TestRequest;

/// Display color hint attached to a log event.
///
/// Serialized as the hex string the bundled web console applies directly,
/// so the wire format stays compatible with existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogColor {
    /// Stage-start announcements
    #[serde(rename = "#58a6ff")]
    Info,
    /// Healthy measurements and verdicts
    #[serde(rename = "#238636")]
    Ok,
    /// Degraded measurements and congestion warnings
    #[serde(rename = "#ffea00")]
    Warn,
    /// Failures and resource-depletion verdicts
    #[serde(rename = "#f85149")]
    Alert,
    /// Separators and other low-emphasis chrome
    #[serde(rename = "#333")]
    Muted,
}

impl LogColor {
    /// Hex string sent over the wire
    pub fn as_hex(&self) -> &'static str {
        match self {
            Self::Info => "#58a6ff",
            Self::Ok => "#238636",
            Self::Warn => "#ffea00",
            Self::Alert => "#f85149",
            Self::Muted => "#333",
        }
    }

    /// Render a message in the closest terminal color
    pub fn paint(&self, message: &str) -> String {
        use colored::Colorize;
        match self {
            Self::Info => message.bright_blue().to_string(),
            Self::Ok => message.green().to_string(),
            Self::Warn => message.yellow().to_string(),
            Self::Alert => message.red().to_string(),
            Self::Muted => message.bright_black().to_string(),
        }
    }
}

/// One line of diagnostic narration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<LogColor>,
}

impl LogEvent {
    /// Create an uncolored event
    pub fn plain<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            color: None,
        }
    }

    /// Create an event with an explicit color hint
    pub fn with_color<S: Into<String>>(message: S, color: LogColor) -> Self {
        Self {
            message: message.into(),
            color: Some(color),
        }
    }

    /// Stage-start announcement (blue)
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self::with_color(message, LogColor::Info)
    }

    /// Healthy measurement or verdict (green)
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Self::with_color(message, LogColor::Ok)
    }

    /// Degraded measurement or warning (yellow)
    pub fn warn<S: Into<String>>(message: S) -> Self {
        Self::with_color(message, LogColor::Warn)
    }

    /// Failure or critical verdict (red)
    pub fn alert<S: Into<String>>(message: S) -> Self {
        Self::with_color(message, LogColor::Alert)
    }

    /// Separator line (muted)
    pub fn muted<S: Into<String>>(message: S) -> Self {
        Self::with_color(message, LogColor::Muted)
    }
}

/// Messages a client may send over the event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request a diagnostic run against a proxy endpoint
    RunTest(TestRequest),
}

/// Messages the server pushes over the event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// One line of diagnostic narration
    Log(LogEvent),
}

/// Destination for pipeline narration.
///
/// Emission is infallible: a sink that can no longer deliver (for example a
/// disconnected WebSocket peer) drops events silently, and the run itself
/// only ends early if one of its probes fails.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Sink feeding the per-connection writer task
pub struct ChannelSink {
    sender: UnboundedSender<LogEvent>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<LogEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LogEvent) {
        // A closed receiver means the peer went away mid-run; the probe
        // calls still run to completion.
        let _ = self.sender.send(event);
    }
}

/// Sink mirroring the session to the server terminal
pub struct TerminalEcho {
    use_color: bool,
}

impl TerminalEcho {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl EventSink for TerminalEcho {
    fn emit(&self, event: LogEvent) {
        match (self.use_color, event.color) {
            (true, Some(color)) => println!("{}", color.paint(&event.message)),
            _ => println!("{}", event.message),
        }
    }
}

/// Sink broadcasting every event to multiple destinations
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: LogEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

/// Sink capturing events in emission order, for tests and benchmarks
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages only, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.message)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
