//! Application settings

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::utils::RetryConfig;

/// Settings for an order-desk session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
    /// Mock data file; the built-in sample is used when unset
    #[serde(default)]
    pub seed_data_path: Option<PathBuf>,
    /// Number of simulated data service outages at startup
    #[serde(default)]
    pub mock_transient_failures: u32,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

/// Load settings: built-in defaults, then `config/order_desk.toml` if present,
/// then `ORDER_DESK__*` environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_from(Config::builder().add_source(File::with_name("config/order_desk").required(false)))
}

fn load_from(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<AppConfig, ConfigError> {
    builder
        .set_default("log_filter", "info,order_desk=debug")?
        .set_default("mock_transient_failures", 0)?
        .set_default("retry.max_attempts", 3)?
        .set_default("retry.initial_delay_ms", 100)?
        .set_default("retry.max_delay_ms", 2000)?
        .set_default("retry.multiplier", 2.0)?
        .add_source(Environment::with_prefix("ORDER_DESK").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults_apply_without_sources() {
        let settings = load_from(Config::builder()).unwrap();

        assert_eq!(settings.log_filter, "info,order_desk=debug");
        assert!(settings.seed_data_path.is_none());
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let toml = r#"
            seed_data_path = "data/other.json"
            mock_transient_failures = 2

            [retry]
            max_attempts = 5
            initial_delay_ms = 10
        "#;
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));

        let settings = load_from(builder).unwrap();
        assert_eq!(settings.seed_data_path, Some(PathBuf::from("data/other.json")));
        assert_eq!(settings.mock_transient_failures, 2);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.max_delay_ms, 2000);
    }

    #[test]
    fn test_retry_settings_convert() {
        let settings = RetrySettings {
            max_attempts: 0,
            initial_delay_ms: 50,
            max_delay_ms: 500,
            multiplier: 3.0,
        };

        let retry = RetryConfig::from(&settings);
        assert_eq!(retry.max_attempts, 1);
        assert_eq!(retry.initial_delay, Duration::from_millis(50));
        assert_eq!(retry.max_delay, Duration::from_millis(500));
    }
}
