//! Service configuration.
//!
//! Loaded from a YAML/TOML file with `MATCHX_`-prefixed environment
//! variables layered on top, so deployments can override single values
//! without editing the file.

use serde::{Deserialize, Serialize};

/// Top-level exchange service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream venues to pull ticker data from
    #[serde(default)]
    pub exchanges: Vec<ExchangeConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// One upstream market-data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    pub ws_url: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            exchanges: Vec::new(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file, with environment overrides.
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("MATCHX").separator("__"))
            .build()?;

        cfg.try_deserialize()
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("MATCHX").separator("__"))
            .build()?;

        cfg.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.exchanges.is_empty());
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  port: 9000
exchanges:
  - name: binance
    ws_url: wss://stream.example.com/ws
    symbols: [BTCUSDT, ETHUSDT]
logging:
  level: debug
metrics:
  enabled: false
"#;
        let cfg: ServiceConfig = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.exchanges.len(), 1);
        assert_eq!(cfg.exchanges[0].symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(cfg.logging.level, "debug");
        assert!(!cfg.metrics.enabled);
    }
}
