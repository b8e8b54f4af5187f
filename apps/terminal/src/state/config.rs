//! # Terminal Configuration
//!
//! Settings the terminal reads once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NORSA_API_BASE_URL=https://staging.example/api/                    │
//! │     NORSA_DB_PATH=/tmp/terminal.db                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/terminal/terminal.toml (Linux)                           │
//! │     ~/Library/Application Support/com.norsa.terminal/terminal.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Production backend, 15 s timeout, 30 s scan timeout               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [api]
//! base_url = "https://norsabackend.herokuapp.com/api/"
//! timeout_secs = 15
//!
//! [api.endpoints]
//! login = "auth/login"
//!
//! [nfc]
//! scan_timeout_secs = 30
//!
//! [storage]
//! database_path = "/var/lib/norsa/terminal.db"
//!
//! [receipt]
//! brand = "Norsa N.V."
//! currency = "NAFL"
//! customer_service_phone = "+5999 767-1563"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use norsa_client::{GatewayConfig, GatewayError};
use norsa_core::receipt::ReceiptBranding;

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "terminal.toml";

/// Name of the database file inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "terminal.db";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading and saving failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid [api] section: {0}")]
    Api(#[from] GatewayError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The platform has no home directory to derive paths from.
    #[error("No {0} path available")]
    NoPath(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// NFC Settings
// =============================================================================

/// Card reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfcSettings {
    /// Seconds a scan waits for a card before failing.
    /// Default: 30
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,
}

fn default_scan_timeout() -> u64 {
    30
}

impl Default for NfcSettings {
    fn default() -> Self {
        NfcSettings {
            scan_timeout_secs: default_scan_timeout(),
        }
    }
}

impl NfcSettings {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local state database location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Explicit database file. `None` uses the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// Receipt Settings
// =============================================================================

/// Texts printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSettings {
    #[serde(default = "default_brand")]
    pub brand: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_customer_service_phone")]
    pub customer_service_phone: String,
}

fn default_brand() -> String {
    ReceiptBranding::default().brand
}

fn default_currency() -> String {
    ReceiptBranding::default().currency
}

fn default_customer_service_phone() -> String {
    ReceiptBranding::default().customer_service_phone
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            brand: default_brand(),
            currency: default_currency(),
            customer_service_phone: default_customer_service_phone(),
        }
    }
}

impl ReceiptSettings {
    pub fn branding(&self) -> ReceiptBranding {
        ReceiptBranding {
            brand: self.brand.clone(),
            currency: self.currency.clone(),
            customer_service_phone: self.customer_service_phone.clone(),
        }
    }
}

// =============================================================================
// Main Terminal Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Backend base URL, timeout and endpoint paths.
    #[serde(default)]
    pub api: GatewayConfig,

    #[serde(default)]
    pub nfc: NfcSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub receipt: ReceiptSettings,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (terminal.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Terminal config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;

        if self.nfc.scan_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "nfc.scan_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.receipt.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("receipt.currency cannot be empty".into()));
        }

        Ok(())
    }

    /// Applies `NORSA_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("NORSA_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("NORSA_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid NORSA_API_TIMEOUT_SECS"),
            }
        }

        if let Some(secs) = lookup("NORSA_SCAN_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.nfc.scan_timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid NORSA_SCAN_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("NORSA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(brand) = lookup("NORSA_RECEIPT_BRAND") {
            self.receipt.brand = brand;
        }

        if let Some(phone) = lookup("NORSA_CUSTOMER_SERVICE_PHONE") {
            self.receipt.customer_service_phone = phone;
        }
    }

    /// Returns the database file path.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.norsa.terminal/terminal.db`
    /// - **Windows**: `%APPDATA%\norsa\terminal\data\terminal.db`
    /// - **Linux**: `~/.local/share/terminal/terminal.db`
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .ok_or(ConfigError::NoPath("database"))
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "norsa", "terminal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.nfc.scan_timeout(), Duration::from_secs(30));
        assert_eq!(config.receipt.currency, "NAFL");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
            [api]
            base_url = "http://127.0.0.1:9000/api/"

            [nfc]
            scan_timeout_secs = 10
            "#,
        )
        .unwrap();

        let config = TerminalConfig::load(Some(path)).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000/api/");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.api.endpoints.login, "auth/login");
        assert_eq!(config.nfc.scan_timeout_secs, 10);
        assert_eq!(config.receipt.brand, "Norsa N.V.");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TerminalConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.nfc, NfcSettings::default());
    }

    #[test]
    fn test_invalid_file_is_reported_and_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[nfc]\nscan_timeout_secs = 0\n").unwrap();

        assert!(matches!(
            TerminalConfig::load(Some(path.clone())),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(
            TerminalConfig::load_or_default(Some(path)).nfc.scan_timeout_secs,
            30
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = TerminalConfig::default();
        config.storage.database_path = Some(dir.path().join("terminal.db"));
        config.receipt.customer_service_phone = "+5999 000-0000".into();
        config.save(Some(path.clone())).unwrap();

        assert_eq!(TerminalConfig::load(Some(path)).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NORSA_API_BASE_URL", "http://localhost:4000/api/"),
            ("NORSA_API_TIMEOUT_SECS", "not-a-number"),
            ("NORSA_SCAN_TIMEOUT_SECS", "5"),
            ("NORSA_DB_PATH", "/tmp/norsa.db"),
        ]
        .into_iter()
        .collect();

        let mut config = TerminalConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://localhost:4000/api/");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.nfc.scan_timeout_secs, 5);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/norsa.db")
        );
    }

    #[test]
    fn test_branding_follows_receipt_section() {
        let mut config = TerminalConfig::default();
        config.receipt.brand = "Norsa Test".into();
        assert_eq!(config.receipt.branding().brand, "Norsa Test");
        assert_eq!(config.receipt.branding().currency, "NAFL");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&TerminalConfig::default()).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[nfc]"));
        assert!(toml_str.contains("[receipt]"));
    }
}
