//! Configuration for the treasurer service

use serde::{Deserialize, Serialize};

/// Treasurer service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Group created at startup
    pub group: moim_ledger::Config,

    /// Group actor configuration
    pub actor: ActorConfig,

    /// Settlement report configuration
    pub report: ReportConfig,

    /// Record Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "moim-treasurer".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            group: moim_ledger::Config::default(),
            actor: ActorConfig::default(),
            report: ReportConfig::default(),
            metrics_enabled: true,
        }
    }
}

/// Group actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Bounded mailbox size per group
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
        }
    }
}

/// Settlement report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Appended to every amount in the report body
    pub currency_suffix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_suffix: "원".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config {
            group: moim_ledger::Config::from_env()
                .map_err(|e| crate::Error::Config(e.to_string()))?,
            ..Config::default()
        };

        if let Ok(raw) = std::env::var("MOIM_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = raw
                .trim()
                .parse()
                .map_err(|e| crate::Error::Config(format!("MOIM_MAILBOX_CAPACITY: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values the runtime depends on
    pub fn validate(&self) -> crate::Result<()> {
        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "actor.mailbox_capacity must be at least 1".to_string(),
            ));
        }
        self.group
            .validate()
            .map_err(|e| crate::Error::Config(e.to_string()))
    }
}
