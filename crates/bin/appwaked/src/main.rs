use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use appwaked::config::Config;
use appwaked::driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        applications = config.applications.len(),
        launch_wait_ms = config.activation.app_launch_wait_time_ms,
        "appwaked reading HMI messages from stdin"
    );

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        summary = driver::run(&config, input, tokio::io::stdout()) => {
            let summary = summary.context("activation driver failed")?;
            tracing::info!(
                requests = summary.requests,
                events = summary.events,
                skipped = summary.skipped,
                abandoned = summary.abandoned,
                "input closed, shutting down"
            );
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            tracing::info!("interrupted, shutting down");
        }
    }

    Ok(())
}
