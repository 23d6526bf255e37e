use crate::cache::AssetCache;
use crate::channel::OffloadChannel;
use crate::config::Config;
use crate::models::Portfolio;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub portfolio: Arc<Mutex<Portfolio>>,
    pub channel: OffloadChannel,
    pub assets: Arc<AssetCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        portfolio: Portfolio,
        channel: OffloadChannel,
        assets: Arc<AssetCache>,
    ) -> Self {
        Self {
            config,
            portfolio: Arc::new(Mutex::new(portfolio)),
            channel,
            assets,
        }
    }
}
