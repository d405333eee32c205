//! Runtime configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional
//! `travel-pricing.toml` in the working directory, then `APP__*`
//! environment variables (after `.env` is loaded).

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::{PolicyBook, PricingError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid pricing policy: {0}")]
    Policy(#[from] PricingError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Postgres URL; bookings are kept in memory when absent
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default)]
    pub policies: PolicyBook,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_cache_capacity() -> u64 {
    10_000
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let builder = Config::builder()
            .add_source(File::with_name("travel-pricing").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut settings = Self::from_builder(builder)?;
        if settings.database_url.is_none() {
            settings.database_url = std::env::var("DATABASE_URL").ok();
        }
        Ok(settings)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.policies.validate()?;
        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use rust_decimal_macros::dec;

    fn from_toml(toml: &str) -> Result<Settings, SettingsError> {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert!(settings.database_url.is_none());
        assert_eq!(settings.policies, PolicyBook::default());
    }

    #[test]
    fn test_refund_table_override() {
        let settings = from_toml(
            r#"
            port = 9090

            [[policies.refund_table]]
            min_hours = 72
            percent = "100"

            [[policies.refund_table]]
            min_hours = 12
            percent = "40"
            "#,
        )
        .unwrap();

        assert_eq!(settings.port, 9090);
        let table = &settings.policies.refund_table;
        assert_eq!(table.percent_for_hours(80), dec!(100));
        assert_eq!(table.percent_for_hours(48), dec!(40));
        assert_eq!(table.percent_for_hours(12), dec!(0));
        // untouched verticals keep their defaults
        assert_eq!(settings.policies.car, PolicyBook::default().car);
    }

    #[test]
    fn test_non_monotonic_refund_table_rejected() {
        let result = from_toml(
            r#"
            [[policies.refund_table]]
            min_hours = 48
            percent = "25"

            [[policies.refund_table]]
            min_hours = 24
            percent = "75"
            "#,
        );
        assert!(result.is_err());
    }
}
