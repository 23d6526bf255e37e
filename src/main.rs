use phonefarm::cache::{ASSET_MANIFEST, AssetCache, CACHE_GENERATION};
use phonefarm::channel::OffloadChannel;
use phonefarm::{AppState, Config, load_portfolio, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let portfolio = load_portfolio(&config.data_path).await;
    let channel = OffloadChannel::spawn(config.compute_timeout);

    let assets = Arc::new(AssetCache::new(config.asset_root.clone()));
    match assets.install(CACHE_GENERATION, ASSET_MANIFEST).await {
        Ok(()) => assets.activate(CACHE_GENERATION).await,
        // A half-populated generation never activates; assets fall back to
        // live origin reads until the next deploy fixes the manifest.
        Err(err) => warn!("asset cache install skipped: {err}"),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, portfolio, channel, assets);
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
