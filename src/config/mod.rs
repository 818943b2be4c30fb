pub mod app_config;
pub mod database;
pub mod logging;

pub use app_config::AppConfig;
pub use database::{migrate, DatabaseConfig};
pub use logging::setup_logging;
