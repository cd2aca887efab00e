use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taskmatch::config::Config;
use taskmatch::routes::build_router;
use taskmatch::source::{CatalogStore, RestCatalogClient};
use taskmatch::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("taskmatch={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TaskMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize catalog backend client
    let client = RestCatalogClient::new(config.catalog_api_url.clone(), config.upstream_timeout);
    info!("Catalog client initialized ({})", config.catalog_api_url);

    // Initial load. A backend that is down at startup leaves an empty catalog
    // until the next refresh succeeds.
    let catalog = Arc::new(CatalogStore::new(Arc::new(client)));
    if let Err(e) = catalog.refresh().await {
        error!("Initial catalog load failed: {e}");
    }

    if !config.catalog_refresh.is_zero() {
        spawn_periodic_refresh(Arc::clone(&catalog), config.catalog_refresh);
        info!(
            "Background catalog refresh every {}s",
            config.catalog_refresh.as_secs()
        );
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_periodic_refresh(catalog: Arc<CatalogStore>, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately; startup already loaded once.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = catalog.refresh().await {
                error!("Background catalog refresh failed: {e}");
            }
        }
    });
}
