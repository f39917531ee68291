use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hireflow::cli::{run_command, Cli};
use hireflow::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, then let flags and env vars win
    let config = Config::load(&cli.config)?.with_overrides(
        cli.api_url.as_deref(),
        cli.publishable_key.as_deref(),
        cli.data_dir.as_deref(),
    );

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("hireflow v{}", env!("CARGO_PKG_VERSION"));

    run_command(&cli, config).await
}
