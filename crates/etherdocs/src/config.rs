//! Configuration with TOML file support.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Durations are written in milliseconds.
//!
//! ```toml
//! [gateway]
//! contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
//! view_timeout_ms = 10000
//! finality_timeout_ms = 120000
//!
//! [qr]
//! module_px = 8
//! ec_level = "m"
//!
//! [coordinator]
//! recheck_after_timeout = false
//!
//! [logging]
//! format = "json"
//! level = "info,etherdocs_gateway=debug"
//! ```

use std::path::Path;

use etherdocs_gateway::GatewayConfig;
use etherdocs_qr::QrConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EtherdocsError, Result};
use crate::logging::LogFormat;

/// Top-level configuration.
///
/// Can be loaded from a TOML file via [`EtherdocsConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtherdocsConfig {
    pub gateway: GatewayConfig,
    pub qr: QrConfig,
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

/// Behaviour switches for the [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// After a registration times out waiting for finality, query the
    /// ledger once before reporting a transport error.
    pub recheck_after_timeout: bool,
    /// Serialize registrations from the same account.
    pub serialize_sessions: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            recheck_after_timeout: false,
            serialize_sessions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directives, e.g. `"info"` or `"debug,etherdocs_qr=trace"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: "info".to_string(),
        }
    }
}

impl EtherdocsConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EtherdocsError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EtherdocsError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EtherdocsError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherdocs_core::Address;
    use etherdocs_qr::EcLevel;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EtherdocsConfig::from_toml_str("").unwrap();
        assert_eq!(config, EtherdocsConfig::default());
        assert!(config.coordinator.serialize_sessions);
        assert!(!config.coordinator.recheck_after_timeout);
        assert_eq!(config.qr.module_px, 8);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml = r#"
            [gateway]
            contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
            finality_timeout_ms = 3000

            [qr]
            ec_level = "h"

            [coordinator]
            recheck_after_timeout = true

            [logging]
            format = "json"
        "#;
        let config = EtherdocsConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.gateway.contract,
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(config.gateway.finality_timeout(), Duration::from_secs(3));
        assert_eq!(config.gateway.view_timeout(), Duration::from_secs(10));
        assert_eq!(config.qr.ec_level, EcLevel::H);
        assert!(config.coordinator.recheck_after_timeout);
        assert!(config.coordinator.serialize_sessions);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = EtherdocsConfig::default();
        config.gateway.contract = Address::from_bytes([0xab; 20]);
        config.coordinator.serialize_sessions = false;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EtherdocsConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_contract_address_is_config_error() {
        let err = EtherdocsConfig::from_toml_str("[gateway]\ncontract = \"nope\"\n").unwrap_err();
        assert!(matches!(err, EtherdocsError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[qr]\nmodule_px = 6").unwrap();
        let config = EtherdocsConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.qr.module_px, 6);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = EtherdocsConfig::from_toml_file("/nonexistent/etherdocs.toml").unwrap_err();
        assert!(matches!(err, EtherdocsError::Config(_)));
    }
}
