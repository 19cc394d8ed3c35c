//! Binary entry point for the proxy diagnostic server.

use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use proxy_sentinel::{app::App, cli::Cli, error::Result, PKG_NAME, VERSION};

#[tokio::main]
async fn main() {
    // Surface panics as plain error lines rather than raw backtraces.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Fatal error: {}", panic_info);
        process::exit(1);
    }));

    // Load .env before clap resolves `env =` fallbacks like PORT.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    init_tracing(&cli);

    if cli.debug {
        debug!("{} v{}", PKG_NAME, VERSION);
        if let Some(commit) = option_env!("GIT_COMMIT") {
            debug!("commit: {}", commit);
        }
        debug!("built: {}", env!("BUILD_TIME"));
    }

    let use_color = cli.use_colors();

    if let Err(error) = run_application(cli).await {
        eprintln!("{}", error.format_for_console(use_color));
        process::exit(error.exit_code());
    }
}

fn init_tracing(cli: &Cli) {
    let default_directives = if cli.debug {
        "proxy_sentinel=debug,tower_http=debug"
    } else {
        "proxy_sentinel=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

async fn run_application(cli: Cli) -> Result<()> {
    let app = App::new(cli)?;
    app.run().await
}
