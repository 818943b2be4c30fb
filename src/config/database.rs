use config::{Config, ConfigError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::app_config::optional_u32;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let cfg = Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let max_connections =
            optional_u32(cfg, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(ConfigError::Message(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            url: cfg.get_string("DATABASE_URL")?,
            max_connections,
        })
    }

    /// Open the connection pool. Called once by the process entry point.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&self.url)
            .await
    }
}

/// Bring the `users` schema up to date.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
