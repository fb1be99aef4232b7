use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = super::connect(config).await?;
    let result = db.migrate().await;
    db.close().await;
    result?;

    output_success(&output_format, "Database schema is up to date", None)
}
