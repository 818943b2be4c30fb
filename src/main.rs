use anyhow::Context;

use account_core::config::{migrate, setup_logging, AppConfig, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = setup_logging();

    tracing::info!("Starting application...");

    let app_config = AppConfig::from_env().context("loading application config")?;
    let db_config = DatabaseConfig::from_env().context("loading database config")?;

    tracing::info!("Loaded configuration for environment: {}", app_config.environment);

    let pool = db_config.connect().await.context("connecting to database")?;
    tracing::info!("Database connection pool created");

    migrate(&pool).await.context("running migrations")?;

    tracing::info!(
        "{} v{} schema is up to date (bcrypt cost {}, reset tokens valid for {} minutes)",
        app_config.app_name,
        app_config.app_version,
        app_config.bcrypt_cost,
        app_config.reset_token_ttl_minutes
    );

    pool.close().await;
    Ok(())
}
