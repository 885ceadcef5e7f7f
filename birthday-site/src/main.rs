// Birthday site - data and endpoint server
// Entry point and logging setup

use anyhow::Context;
use birthday_site::config::SiteConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "birthday_site=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting birthday site");

    let config = SiteConfig::from_env().context("Failed to load configuration")?;

    birthday_site::start_server(config)
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
