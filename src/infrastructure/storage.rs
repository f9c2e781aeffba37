use crate::config::AppConfig;
use std::path::PathBuf;
use tracing::info;

/// Makes sure the upload root exists before the server starts taking photos
pub async fn setup_upload_root(config: &AppConfig) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!(
        "🖼️  Upload root: {} (served at {})",
        config.upload_dir.display(),
        config.public_prefix
    );
    Ok(config.upload_dir.clone())
}
