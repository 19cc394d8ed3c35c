//! Configuration validation utilities and rules

use std::path::Path;

use crate::{config::Config, error::Result};

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks.
    ///
    /// Hard errors come from `Config::validate`; everything returned here is
    /// advisory and reported at startup without blocking the server.
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        // Basic validation (already done in Config::validate)
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_server_settings(config));
        warnings.extend(Self::validate_pipeline_settings(config));
        warnings.extend(Self::validate_verdict_rules(config));

        Ok(warnings)
    }

    fn validate_server_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let server = &config.server;

        if server.port == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Port 0 binds an ephemeral port chosen by the operating system".to_string(),
            ));
        } else if server.port < 1024 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Port {} is privileged and may require elevated permissions",
                    server.port
                ),
            ));
        }

        if !Path::new(&server.public_dir).is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Public directory '{}' does not exist; static asset requests will return 404",
                    server.public_dir
                ),
            ));
        }

        warnings
    }

    fn validate_pipeline_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let pipeline = &config.pipeline;

        if !pipeline.download_stage {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Download stage is disabled; bandwidth depletion verdicts will never fire"
                    .to_string(),
            ));
        }

        if pipeline.handshake_timeout_secs > pipeline.download_timeout_secs {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Handshake timeout ({}s) exceeds download timeout ({}s)",
                    pipeline.handshake_timeout_secs, pipeline.download_timeout_secs
                ),
            ));
        }

        warnings
    }

    fn validate_verdict_rules(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let pipeline = &config.pipeline;
        let rules = &pipeline.rules;

        if rules.distant_ms >= rules.congested_ms {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Distance threshold ({}ms) is not below the congestion threshold ({}ms); \
                     the geographic distance notice can never fire",
                    rules.distant_ms, rules.congested_ms
                ),
            ));
        }

        if rules.congested_ms < pipeline.latency_caution_ms {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Congestion threshold ({}ms) is below the latency caution threshold ({}ms); \
                     congested runs will still show a healthy latency line",
                    rules.congested_ms, pipeline.latency_caution_ms
                ),
            ));
        }

        if rules.depleted_mbps > pipeline.throughput_caution_mbps {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Depleted bandwidth threshold ({} Mbps) is above the throughput caution \
                     threshold ({} Mbps); depleted runs will still show a healthy speed line",
                    rules.depleted_mbps, pipeline.throughput_caution_mbps
                ),
            ));
        }

        warnings
    }
}

/// Validation warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get string representation of warning level
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            match self.level {
                ValidationLevel::Info => {
                    format!("[{}] {}", self.level.as_str().cyan(), self.message)
                }
                ValidationLevel::Warning => {
                    format!("[{}] {}", self.level.as_str().yellow().bold(), self.message)
                }
            }
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
