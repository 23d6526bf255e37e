use crate::errors::AppError;
use crate::models::Portfolio;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_portfolio(path: &Path) -> Portfolio {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(portfolio) => portfolio,
            Err(err) => {
                error!("failed to parse portfolio file: {err}");
                Portfolio::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Portfolio::default(),
        Err(err) => {
            error!("failed to read portfolio file: {err}");
            Portfolio::default()
        }
    }
}

pub async fn persist_portfolio(path: &Path, portfolio: &Portfolio) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(portfolio).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
