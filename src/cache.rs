use crate::errors::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Every asset required for offline operation, fixed at build time.
pub const ASSET_MANIFEST: &[&str] = &["/assets/style.css", "/assets/app.js"];

/// Name of the cache generation the current build installs. Bump when the
/// asset set changes; activation evicts everything else.
pub const CACHE_GENERATION: &str = "phonefarm-static-v1";

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    Cache,
    Origin,
}

#[derive(Debug)]
pub struct AssetResponse {
    pub body: Vec<u8>,
    pub source: AssetSource,
}

#[derive(Default)]
struct CacheState {
    active: Option<String>,
    generations: HashMap<String, HashMap<String, Vec<u8>>>,
}

/// Generation-scoped asset cache in front of a directory origin. Intercepts
/// take the read lock; install/activate take the write lock, so a reader
/// never observes a store mid-deletion.
pub struct AssetCache {
    asset_root: PathBuf,
    state: RwLock<CacheState>,
}

impl AssetCache {
    pub fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Populate a named generation from the manifest. All origin reads happen
    /// before anything is stored: one failure aborts the whole install and
    /// leaves no partially populated generation behind.
    pub async fn install(&self, generation: &str, manifest: &[&str]) -> Result<(), Error> {
        let mut entries = HashMap::with_capacity(manifest.len());
        for path in manifest {
            let body = self
                .fetch_origin(path)
                .await
                .map_err(|err| Error::InstallFailed {
                    path: (*path).to_string(),
                    reason: err.to_string(),
                })?;
            entries.insert((*path).to_string(), body);
        }

        let mut state = self.state.write().await;
        state.generations.insert(generation.to_string(), entries);
        info!(generation, assets = manifest.len(), "cache generation installed");
        Ok(())
    }

    /// Make `generation` the live one and delete every other generation.
    /// At most one generation survives activation.
    pub async fn activate(&self, generation: &str) {
        let mut state = self.state.write().await;
        state.generations.retain(|name, _| name == generation);
        state.active = Some(generation.to_string());
        info!(generation, "cache generation activated");
    }

    /// Cache-first lookup: a hit is served without touching the origin; a
    /// miss falls through to a live origin read and is not cached (growth
    /// happens only at install time).
    pub async fn intercept(&self, path: &str) -> Result<AssetResponse, Error> {
        {
            let state = self.state.read().await;
            if let Some(active) = &state.active {
                if let Some(body) = state
                    .generations
                    .get(active)
                    .and_then(|entries| entries.get(path))
                {
                    debug!(path, generation = %active, "asset served from cache");
                    return Ok(AssetResponse {
                        body: body.clone(),
                        source: AssetSource::Cache,
                    });
                }
            }
        }

        debug!(path, "asset cache miss, fetching from origin");
        let body = self
            .fetch_origin(path)
            .await
            .map_err(|_| Error::AssetNotFound(path.to_string()))?;
        Ok(AssetResponse {
            body,
            source: AssetSource::Origin,
        })
    }

    async fn fetch_origin(&self, path: &str) -> Result<Vec<u8>, std::io::Error> {
        fs::read(self.resolve(path)?).await
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, std::io::Error> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path escapes asset root",
            ));
        }
        Ok(self.asset_root.join(relative))
    }
}

/// Content type for the handful of asset kinds the manifest can name.
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
