use std::{env, path::PathBuf, time::Duration};

/// Runtime configuration, resolved once in `main` and injected everywhere.
/// The aggregator itself never reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Record store JSON file.
    pub data_path: PathBuf,
    /// Directory the asset origin serves from; request paths resolve
    /// beneath it (`/assets/app.js` -> `<asset_root>/assets/app.js`).
    pub asset_root: PathBuf,
    pub port: u16,
    /// Upper bound on waiting for a background computation reply.
    pub compute_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/portfolio.json"));
        let asset_root = env::var("ASSET_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);
        let compute_timeout = env::var("COMPUTE_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(5));

        Self {
            data_path,
            asset_root,
            port,
            compute_timeout,
        }
    }
}
