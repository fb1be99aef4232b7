use anyhow::Context;

use crate::config::AppConfig;
use crate::database::Store;
use crate::server;
use crate::state::AppState;

pub async fn handle(config: &AppConfig, in_memory: bool) -> anyhow::Result<()> {
    tracing::info!("Starting Shopfront API in {:?} mode", config.environment);

    let store = if in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        Store::memory()
    } else {
        let db = super::connect(config).await?;
        db.migrate().await.context("failed to apply the database schema")?;
        Store::postgres(db)
    };

    let state = AppState::new(config, store).context("invalid security configuration")?;
    server::serve(state, config).await
}
