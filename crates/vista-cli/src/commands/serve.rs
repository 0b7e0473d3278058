use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;
use vista_web::AppState;

pub async fn execute(config_path: &Path, addr: SocketAddr) -> Result<()> {
    let config = vista_config::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    info!(title = %config.title, "Configuration loaded");

    let state = AppState::from_config(config).await?;
    vista_web::start_server(state, addr).await?;
    Ok(())
}
