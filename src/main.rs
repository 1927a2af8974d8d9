use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crime_atlas::server::{self, AppState};
use crime_atlas::{CrimeTable, DashboardConfig, MapView};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::from_env().context("reading configuration")?;
    if config.access_token.is_empty() {
        warn!("MAPBOX_ACCESS_TOKEN is not set, falling back to OpenStreetMap tiles");
    }

    let table = CrimeTable::load(&config.data_path, config.unmapped)
        .with_context(|| format!("preparing {}", config.data_path.display()))?;
    let view = MapView::with_access_token(config.access_token.clone());

    server::serve(&config.bind_addr(), AppState::new(table, view))
        .await
        .context("serving dashboard")?;
    Ok(())
}
