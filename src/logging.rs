use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ConfigError;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            loki_enabled: lookup("LOKI_ENABLED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(false),
            loki_url: lookup("LOKI_URL"),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "portfolio-tracker".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            // sqlx logs every statement at info; keep it quieter unless asked
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info,sqlx=warn".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(ConfigError::Missing("LOKI_URL"));
        }
        Ok(())
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!(service = %config.service_name, "Console logging initialized");
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(loki_url)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // Ships buffered events to Loki for the life of the process
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("Loki logging initialized at {}", loki_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LoggingConfig {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        LoggingConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert!(!config.loki_enabled);
        assert_eq!(config.service_name, "portfolio-tracker");
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_level, "info,sqlx=warn");
    }

    #[test]
    fn test_loki_requires_url() {
        let config = config_from(&[("LOKI_ENABLED", "true")]);
        assert_eq!(config.validate(), Err(ConfigError::Missing("LOKI_URL")));

        let config = config_from(&[("LOKI_ENABLED", "true"), ("LOKI_URL", "http://loki:3100")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_flag_means_disabled() {
        assert!(!config_from(&[("LOKI_ENABLED", "yes please")]).loki_enabled);
    }
}
