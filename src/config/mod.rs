//! Configuration data model and assembly

pub mod validation;

pub use validation::{validate_config, ConfigValidator, ValidationLevel, ValidationWarning};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    cli::Cli,
    defaults,
    error::{AppError, Result},
};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listener and session options
    #[serde(default)]
    pub server: ServerConfig,

    /// Tunables for each diagnostic run
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Listener and session options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static assets served at the root path
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Mirror every session's narration to the server terminal
    #[serde(default)]
    pub echo_sessions: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

/// Tunables for one diagnostic run.
///
/// The two historical pipeline variants (with and without the download
/// stage) collapse into this single configurable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Handshake stage timeout in seconds
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    /// Download stage timeout in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Run the 1 MiB download stage after the handshake stage
    #[serde(default = "default_download_stage")]
    pub download_stage: bool,

    /// Latency above this value gets the caution color on its stage line
    #[serde(default = "default_latency_caution_ms")]
    pub latency_caution_ms: u64,

    /// Throughput below this value gets the caution color on its stage line
    #[serde(default = "default_throughput_caution_mbps")]
    pub throughput_caution_mbps: f64,

    /// Verdict classification thresholds
    #[serde(default)]
    pub rules: VerdictRules,
}

/// Thresholds driving the verdict block, checked in precedence order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictRules {
    /// Throughput below this many Mbps means the node's bandwidth is depleted
    #[serde(default = "default_depleted_mbps")]
    pub depleted_mbps: f64,

    /// Latency above this many milliseconds means the node is congested
    #[serde(default = "default_congested_ms")]
    pub congested_ms: u64,

    /// Latency above this many milliseconds suggests geographic distance
    #[serde(default = "default_distant_ms")]
    pub distant_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_dir: default_public_dir(),
            echo_sessions: false,
            enable_color: default_enable_color(),
            debug: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: default_handshake_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            download_stage: default_download_stage(),
            latency_caution_ms: default_latency_caution_ms(),
            throughput_caution_mbps: default_throughput_caution_mbps(),
            rules: VerdictRules::default(),
        }
    }
}

impl Default for VerdictRules {
    fn default() -> Self {
        Self {
            depleted_mbps: default_depleted_mbps(),
            congested_ms: default_congested_ms(),
            distant_ms: default_distant_ms(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the configuration from parsed command-line arguments.
    ///
    /// Flag values already carry their environment fallbacks, so precedence
    /// is flag over environment over default.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Self {
            server: ServerConfig {
                port: cli.port,
                public_dir: cli.public_dir.clone(),
                echo_sessions: cli.echo,
                enable_color: cli.use_colors(),
                debug: cli.debug,
            },
            pipeline: PipelineConfig {
                handshake_timeout_secs: cli.handshake_timeout,
                download_timeout_secs: cli.download_timeout,
                download_stage: !cli.skip_download,
                latency_caution_ms: cli.latency_caution_ms,
                throughput_caution_mbps: cli.throughput_caution_mbps,
                rules: VerdictRules {
                    depleted_mbps: cli.depleted_mbps,
                    congested_ms: cli.congested_ms,
                    distant_ms: cli.distant_ms,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.server.public_dir.trim().is_empty() {
            return Err(AppError::config("Public directory cannot be empty"));
        }

        let pipeline = &self.pipeline;
        if pipeline.handshake_timeout_secs == 0 {
            return Err(AppError::config("Handshake timeout must be greater than 0"));
        }
        if pipeline.handshake_timeout_secs > defaults::MAX_HANDSHAKE_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Handshake timeout cannot exceed {} seconds",
                defaults::MAX_HANDSHAKE_TIMEOUT_SECS
            )));
        }
        if pipeline.download_timeout_secs == 0 {
            return Err(AppError::config("Download timeout must be greater than 0"));
        }
        if pipeline.download_timeout_secs > defaults::MAX_DOWNLOAD_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Download timeout cannot exceed {} seconds",
                defaults::MAX_DOWNLOAD_TIMEOUT_SECS
            )));
        }
        if pipeline.latency_caution_ms == 0 {
            return Err(AppError::config(
                "Latency caution threshold must be greater than 0",
            ));
        }
        if !pipeline.throughput_caution_mbps.is_finite() || pipeline.throughput_caution_mbps <= 0.0
        {
            return Err(AppError::config(
                "Throughput caution threshold must be a positive number",
            ));
        }

        let rules = &pipeline.rules;
        if !rules.depleted_mbps.is_finite() || rules.depleted_mbps <= 0.0 {
            return Err(AppError::config(
                "Depleted bandwidth threshold must be a positive number",
            ));
        }
        if rules.congested_ms == 0 {
            return Err(AppError::config(
                "Congestion threshold must be greater than 0",
            ));
        }
        if rules.distant_ms == 0 {
            return Err(AppError::config(
                "Distance threshold must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl PipelineConfig {
    /// Handshake stage timeout as a Duration
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Download stage timeout as a Duration
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

// Default value functions for serde
fn default_port() -> u16 {
    defaults::DEFAULT_PORT
}

fn default_public_dir() -> String {
    defaults::DEFAULT_PUBLIC_DIR.to_string()
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

fn default_handshake_timeout_secs() -> u64 {
    defaults::DEFAULT_HANDSHAKE_TIMEOUT_SECS
}

fn default_download_timeout_secs() -> u64 {
    defaults::DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_download_stage() -> bool {
    true
}

fn default_latency_caution_ms() -> u64 {
    defaults::DEFAULT_LATENCY_CAUTION_MS
}

fn default_throughput_caution_mbps() -> f64 {
    defaults::DEFAULT_THROUGHPUT_CAUTION_MBPS
}

fn default_depleted_mbps() -> f64 {
    defaults::DEFAULT_DEPLETED_MBPS
}

fn default_congested_ms() -> u64 {
    defaults::DEFAULT_CONGESTED_MS
}

fn default_distant_ms() -> u64 {
    defaults::DEFAULT_DISTANT_MS
}
