//! Main application orchestration and execution

use tracing::{debug, info};

use crate::{
    cli::Cli,
    config::{validate_config, Config},
    error::Result,
    server,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Load configuration, report advisory findings, then serve until
    /// shutdown
    pub async fn run(self) -> Result<()> {
        let config = Config::from_cli(&self.cli)?;

        if config.server.debug {
            debug!("configuration: {}", self.cli.summary());
        }

        let warnings = validate_config(&config)?;
        if !warnings.is_empty() {
            for warning in &warnings {
                eprintln!("{}", warning.format(config.server.enable_color));
            }
            info!(count = warnings.len(), "configuration findings reported");
        }

        server::serve(config).await
    }
}
