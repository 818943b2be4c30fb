pub mod config;
pub mod dto;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;

pub use errors::{AppError, AppResult};
