//! Exchange desk server binary

use exchange_desk::{Config, ExchangeDesk};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting SangoFX Exchange Desk");

    // Load configuration from a file argument, or from the environment
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let desk = ExchangeDesk::new(config).await?;
    tracing::info!("Exchange desk opened successfully");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down exchange desk server");
    desk.shutdown().await?;
    Ok(())
}
