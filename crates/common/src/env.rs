//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data directory exists at startup.

use tracing::{info, warn};

/// Ensure the data directory exists, creating it (and parents) when missing.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{data_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%data_dir, "data directory not found; creating it");
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
            info!(%data_dir, "data directory created");
            Ok(())
        }
    }
}
