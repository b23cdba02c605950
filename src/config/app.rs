//! Application configuration loading from config.toml
//!
//! The configuration is an explicit value built once at start-up and handed to the
//! components that need it. It carries the database URL and the fallback values used
//! when a pricing or branding key is missing from the settings store.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default `SQLite` location, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/solar_portal.sqlite?mode=rwc";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Fallback pricing parameters
    pub pricing: PricingConfig,
    /// Fallback branding values
    pub branding: BrandingConfig,
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Values the quote calculator falls back to when the settings store has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price per watt for residential systems
    pub cost_per_watt_residential: f64,
    /// Price per watt for commercial systems
    pub cost_per_watt_commercial: f64,
    /// Money saved per kWh generated
    pub savings_per_kwh: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cost_per_watt_residential: 210.0,
            cost_per_watt_commercial: 180.0,
            savings_per_kwh: 20.0,
        }
    }
}

/// Company name and currency shown on every page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Company name
    pub company_name: String,
    /// Currency label used in prices
    pub default_currency: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            company_name: "Veeteq Solar".to_string(),
            default_currency: "KSh".to_string(),
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration named by `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file is not an error: the built-in defaults are used. `DATABASE_URL`,
/// when set, overrides the configured database URL.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!("No configuration file at {path}, using defaults");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [pricing]
            cost_per_watt_residential = 400.0
            cost_per_watt_commercial = 350.0
            savings_per_kwh = 22.5

            [branding]
            company_name = "Sunrise Energy"
            default_currency = "USD"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.pricing.cost_per_watt_residential, 400.0);
        assert_eq!(config.pricing.cost_per_watt_commercial, 350.0);
        assert_eq!(config.pricing.savings_per_kwh, 22.5);
        assert_eq!(config.branding.company_name, "Sunrise Energy");
        assert_eq!(config.branding.default_currency, "USD");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let toml_str = r#"
            [pricing]
            savings_per_kwh = 25.0
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.pricing.cost_per_watt_residential, 210.0);
        assert_eq!(config.pricing.cost_per_watt_commercial, 180.0);
        assert_eq!(config.pricing.savings_per_kwh, 25.0);
        assert_eq!(config.branding, BrandingConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pricing\nsavings_per_kwh = ").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
