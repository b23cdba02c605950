/// Application configuration loading from config.toml
pub mod app;

/// Database connection and table creation
pub mod database;

pub use app::{AppConfig, BrandingConfig, PricingConfig, load_app_config, load_config};
