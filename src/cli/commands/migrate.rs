use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseError, DatabaseManager};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config::config().database;
    let url = database
        .url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

    let pool = DatabaseManager::connect(url, database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_success(
        &output_format,
        &format!("migrations applied to {}", DatabaseManager::redact_url(url)?),
        None,
    )
}
