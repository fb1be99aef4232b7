pub mod migrate;
pub mod serve;
pub mod user;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Connect to `DATABASE_URL` or explain why not
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<DatabaseManager> {
    DatabaseManager::connect(&config.database)
        .await
        .context("could not connect to the database (is DATABASE_URL set?)")
}
