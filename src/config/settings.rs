//! Configuration settings structures for pushgate
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "pushgate".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_true() -> bool {
    true
}

fn default_gcm_api_url() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_gcm_batch_size() -> usize {
    1000
}

fn default_apns_environment() -> String {
    "production".to_string()
}

fn default_apns_sound() -> String {
    "default".to_string()
}

fn default_blackberry_api_url() -> String {
    "https://pushapi.na.blackberry.com/mss/PD_pushRequest".to_string()
}

fn default_deliver_before_secs() -> u64 {
    900
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// GCM Gateway Configuration
// ============================================================================

/// Google Cloud Messaging gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcmConfig {
    /// Whether this gateway is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Gateway send endpoint
    #[serde(default = "default_gcm_api_url")]
    pub api_url: String,

    /// Server API key used in the Authorization header
    #[serde(default)]
    pub api_key: String,

    /// Maximum registration ids per multicast request
    #[serde(default = "default_gcm_batch_size")]
    pub batch_size: usize,
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_gcm_api_url(),
            api_key: String::new(),
            batch_size: default_gcm_batch_size(),
        }
    }
}

// ============================================================================
// APNs Gateway Configuration
// ============================================================================

/// Apple push gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApnsConfig {
    /// Whether this gateway is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Target environment: "production" or "sandbox"
    #[serde(default = "default_apns_environment")]
    pub environment: String,

    /// Path to the provider certificate the protocol client connects with
    #[serde(default)]
    pub certificate_path: String,

    /// Certificate passphrase, if the certificate is protected
    #[serde(default)]
    pub certificate_passphrase: Option<String>,

    /// Sound used when the message does not name one
    #[serde(default = "default_apns_sound")]
    pub default_sound: String,
}

impl Default for ApnsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            environment: default_apns_environment(),
            certificate_path: String::new(),
            certificate_passphrase: None,
            default_sound: default_apns_sound(),
        }
    }
}

// ============================================================================
// BlackBerry Gateway Configuration
// ============================================================================

/// BlackBerry PAP gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackberryConfig {
    /// Whether this gateway is enabled
    #[serde(default)]
    pub enabled: bool,

    /// PAP push request endpoint
    #[serde(default = "default_blackberry_api_url")]
    pub api_url: String,

    /// Application id; doubles as the PAP source reference
    #[serde(default)]
    pub application_id: String,

    /// Basic auth password for the push API
    #[serde(default)]
    pub password: String,

    /// Seconds the gateway may hold an undelivered push before discarding it
    #[serde(default = "default_deliver_before_secs")]
    pub deliver_before_secs: u64,
}

impl Default for BlackberryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_blackberry_api_url(),
            application_id: String::new(),
            password: String::new(),
            deliver_before_secs: default_deliver_before_secs(),
        }
    }
}

// ============================================================================
// Logger Settings (compatible with LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// Logger configuration settings (compatible with LoggerConfig)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: ConsoleSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format: LogFormat =
            self.format
                .parse()
                .map_err(|e: anyhow::Error| ConfigError::ValidationError {
                    field: "logger.format".to_string(),
                    message: e.to_string(),
                })?;

        LoggerConfig::new(
            ConsoleConfig::new(self.console.enabled, self.console.colored),
            format,
            self.level,
        )
        .map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Settings root
// ============================================================================

/// Root settings structure aggregating all configuration sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Logger settings
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Google gateway settings
    #[serde(default)]
    pub gcm: GcmConfig,

    /// Apple gateway settings
    #[serde(default)]
    pub apns: ApnsConfig,

    /// BlackBerry gateway settings
    #[serde(default)]
    pub blackberry: BlackberryConfig,
}
