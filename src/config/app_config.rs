use config::{Config, ConfigError};
use serde::Deserialize;

const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 10;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub app_name: String,
    pub app_version: String,
    /// bcrypt work factor used for stored passwords
    pub bcrypt_cost: u32,
    pub reset_token_ttl_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            app_name: "account-core".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            reset_token_ttl_minutes: DEFAULT_RESET_TOKEN_TTL_MINUTES,
        }
    }
}

/// An integer setting that may be absent. Present but malformed values are errors.
pub(crate) fn optional_int(cfg: &Config, key: &str) -> Result<Option<i64>, ConfigError> {
    match cfg.get_int(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// An optional non-negative integer setting that must fit in a `u32`.
pub(crate) fn optional_u32(cfg: &Config, key: &str) -> Result<Option<u32>, ConfigError> {
    optional_int(cfg, key)?
        .map(|value| {
            u32::try_from(value)
                .map_err(|_| ConfigError::Message(format!("{} must be a non-negative integer, got {}", key, value)))
        })
        .transpose()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let cfg = Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bcrypt_cost = optional_u32(cfg, "BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost);
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                bcrypt_cost
            )));
        }

        let reset_token_ttl_minutes =
            optional_int(cfg, "RESET_TOKEN_TTL_MINUTES")?.unwrap_or(defaults.reset_token_ttl_minutes);
        if reset_token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(format!(
                "RESET_TOKEN_TTL_MINUTES must be positive, got {}",
                reset_token_ttl_minutes
            )));
        }

        Ok(Self {
            environment: cfg.get_string("ENVIRONMENT").unwrap_or(defaults.environment),
            app_name: cfg.get_string("APP_NAME").unwrap_or(defaults.app_name),
            app_version: cfg.get_string("APP_VERSION").unwrap_or(defaults.app_version),
            bcrypt_cost,
            reset_token_ttl_minutes,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
