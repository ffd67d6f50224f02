//! Service configuration.
//!
//! Configuration is read from a TOML file, overlaid with environment
//! variables, then validated:
//!
//! ```toml
//! log_filter = "info"
//!
//! [ledger]
//! channel_id = "hlfexample"
//! contract_id = "example-service"
//! contract_version = "0"
//!
//! [coordinator]
//! commit_timeout_ms = 20000
//! event_name = "eventInvoke"
//!
//! [gateway]
//! bind = "0.0.0.0:80"
//! history_format = "compat"
//! ```
//!
//! Every key is optional; missing keys take the defaults shown. Unknown keys
//! are rejected.
//!
//! ## Environment overrides
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `IDLEDGER_BIND` | `gateway.bind` |
//! | `IDLEDGER_COMMIT_TIMEOUT_MS` | `coordinator.commit_timeout_ms` |
//! | `IDLEDGER_CHANNEL_ID` | `ledger.channel_id` |
//! | `IDLEDGER_CONTRACT_ID` | `ledger.contract_id` |
//! | `IDLEDGER_LOG` | `log_filter` |

use idledger_coordinator::CoordinatorConfig;
use idledger_core::HistoryFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed
    #[error("invalid value '{value}' for {var}")]
    Env {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// A setting is out of range
    #[error("invalid setting {0}")]
    Invalid(String),
}

/// `[ledger]` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Channel the contract is instantiated on
    pub channel_id: String,
    /// Id the record contract is installed under
    pub contract_id: String,
    /// Installed contract version
    pub contract_version: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            channel_id: "hlfexample".to_string(),
            contract_id: "example-service".to_string(),
            contract_version: "0".to_string(),
        }
    }
}

/// `[gateway]` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to
    pub bind: String,
    /// Wire format of `/history` responses
    pub history_format: HistoryFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:80".to_string(),
            history_format: HistoryFormat::Compat,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ledger bootstrap settings
    pub ledger: LedgerConfig,
    /// Write coordination settings
    pub coordinator: CoordinatorConfig,
    /// HTTP settings
    pub gateway: GatewayConfig,
    /// Default `tracing` filter directive
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            coordinator: CoordinatorConfig::default(),
            gateway: GatewayConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Overlay `IDLEDGER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Overlay overrides looked up through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("IDLEDGER_BIND") {
            self.gateway.bind = bind;
        }
        if let Some(raw) = lookup("IDLEDGER_COMMIT_TIMEOUT_MS") {
            self.coordinator.commit_timeout_ms =
                raw.trim().parse().map_err(|_| ConfigError::Env {
                    var: "IDLEDGER_COMMIT_TIMEOUT_MS",
                    value: raw.clone(),
                })?;
        }
        if let Some(channel) = lookup("IDLEDGER_CHANNEL_ID") {
            self.ledger.channel_id = channel;
        }
        if let Some(contract) = lookup("IDLEDGER_CONTRACT_ID") {
            self.ledger.contract_id = contract;
        }
        if let Some(filter) = lookup("IDLEDGER_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinator.commit_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "coordinator.commit_timeout_ms: must be greater than zero".into(),
            ));
        }
        let required = [
            ("ledger.channel_id", &self.ledger.channel_id),
            ("ledger.contract_id", &self.ledger.contract_id),
            ("coordinator.event_name", &self.coordinator.event_name),
            ("gateway.bind", &self.gateway.bind),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{}: must not be empty", name)));
            }
        }
        Ok(())
    }
}
