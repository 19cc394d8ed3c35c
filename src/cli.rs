//! Command-line interface for the diagnostic server

use clap::Parser;

/// Proxy Sentinel - streams live proxy diagnostics to connected clients
#[derive(Parser, Debug, Clone)]
#[command(name = "sentinel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port the server listens on
    #[arg(short, long, env = "PORT", default_value_t = crate::defaults::DEFAULT_PORT)]
    pub port: u16,

    /// Directory of static assets served at the root path
    #[arg(long, env = "PUBLIC_DIR", default_value = crate::defaults::DEFAULT_PUBLIC_DIR)]
    pub public_dir: String,

    /// Handshake stage timeout in seconds
    #[arg(long, value_parser = parse_handshake_timeout, default_value_t = crate::defaults::DEFAULT_HANDSHAKE_TIMEOUT_SECS)]
    pub handshake_timeout: u64,

    /// Download stage timeout in seconds
    #[arg(long, value_parser = parse_download_timeout, default_value_t = crate::defaults::DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout: u64,

    /// Skip the 1 MiB download stage
    #[arg(long)]
    pub skip_download: bool,

    /// Latency above this many milliseconds is tagged with the caution color
    #[arg(long, default_value_t = crate::defaults::DEFAULT_LATENCY_CAUTION_MS)]
    pub latency_caution_ms: u64,

    /// Throughput below this many Mbps is tagged with the caution color
    #[arg(long, default_value_t = crate::defaults::DEFAULT_THROUGHPUT_CAUTION_MBPS)]
    pub throughput_caution_mbps: f64,

    /// Throughput below this many Mbps triggers the resource depletion verdict
    #[arg(long, default_value_t = crate::defaults::DEFAULT_DEPLETED_MBPS)]
    pub depleted_mbps: f64,

    /// Latency above this many milliseconds triggers the congestion verdict
    #[arg(long, default_value_t = crate::defaults::DEFAULT_CONGESTED_MS)]
    pub congested_ms: u64,

    /// Latency above this many milliseconds triggers the geographic distance notice
    #[arg(long, default_value_t = crate::defaults::DEFAULT_DISTANT_MS)]
    pub distant_ms: u64,

    /// Mirror each session's narration to the server terminal
    #[arg(long)]
    pub echo: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.public_dir.trim().is_empty() {
            return Err("Public directory cannot be empty".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true // Force color output when --color is specified
        } else if self.no_color {
            false // Disable color output when --no-color is specified
        } else {
            supports_color() // Use automatic detection
        }
    }

    /// One-line startup summary for debug logging
    pub fn summary(&self) -> String {
        format!(
            "port={} public_dir={} handshake_timeout={}s download_timeout={}s download_stage={} echo={}",
            self.port,
            self.public_dir,
            self.handshake_timeout,
            self.download_timeout,
            !self.skip_download,
            self.echo,
        )
    }
}

fn parse_handshake_timeout(s: &str) -> Result<u64, String> {
    parse_timeout_secs(s, crate::defaults::MAX_HANDSHAKE_TIMEOUT_SECS)
}

fn parse_download_timeout(s: &str) -> Result<u64, String> {
    parse_timeout_secs(s, crate::defaults::MAX_DOWNLOAD_TIMEOUT_SECS)
}

/// Parse a timeout value in seconds with sanity bounds
fn parse_timeout_secs(s: &str, max_secs: u64) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if secs > max_secs {
                Err(format!("Timeout cannot exceed {} seconds", max_secs))
            } else {
                Ok(secs)
            }
        })
}

/// Check whether the current terminal is likely to support ANSI colors
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
