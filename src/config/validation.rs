//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ApnsConfig, BlackberryConfig, GcmConfig, LoggerSettings, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Valid APNs environments
const VALID_APNS_ENVIRONMENTS: &[&str] = &["production", "sandbox"];

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl GcmConfig {
    /// Validate GCM gateway configuration
    ///
    /// # Validation Rules (applied only when the gateway is enabled)
    /// - API url must be an http(s) URL
    /// - API key must not be empty
    /// - Batch size must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if !is_http_url(&self.api_url) {
            return Err(ConfigError::validation(
                "gcm.api_url",
                "API url must start with http:// or https://.",
            ));
        }

        if self.api_key.is_empty() {
            return Err(ConfigError::validation(
                "gcm.api_key",
                "API key is required when the GCM gateway is enabled.",
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::validation(
                "gcm.batch_size",
                "Batch size must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl ApnsConfig {
    /// Validate APNs gateway configuration
    ///
    /// # Validation Rules (applied only when the gateway is enabled)
    /// - Environment must be "production" or "sandbox"
    /// - Certificate path must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if !VALID_APNS_ENVIRONMENTS.contains(&self.environment.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "apns.environment".to_string(),
                message: format!(
                    "Invalid environment '{}'. Valid environments are: {}",
                    self.environment,
                    VALID_APNS_ENVIRONMENTS.join(", ")
                ),
            });
        }

        if self.certificate_path.trim().is_empty() {
            return Err(ConfigError::validation(
                "apns.certificate_path",
                "Certificate path is required when the APNs gateway is enabled.",
            ));
        }

        Ok(())
    }
}

impl BlackberryConfig {
    /// Validate BlackBerry gateway configuration
    ///
    /// # Validation Rules (applied only when the gateway is enabled)
    /// - API url must be an http(s) URL
    /// - Application id and password must not be empty
    /// - Delivery deadline must be greater than 0 seconds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if !is_http_url(&self.api_url) {
            return Err(ConfigError::validation(
                "blackberry.api_url",
                "API url must start with http:// or https://.",
            ));
        }

        if self.application_id.is_empty() {
            return Err(ConfigError::validation(
                "blackberry.application_id",
                "Application id is required when the BlackBerry gateway is enabled.",
            ));
        }

        if self.password.is_empty() {
            return Err(ConfigError::validation(
                "blackberry.password",
                "Password is required when the BlackBerry gateway is enabled.",
            ));
        }

        if self.deliver_before_secs == 0 {
            return Err(ConfigError::validation(
                "blackberry.deliver_before_secs",
                "Delivery deadline must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.gcm.validate()?;
        self.apns.validate()?;
        self.blackberry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // GcmConfig validation tests
    // ========================================================================

    #[test]
    fn test_gcm_config_disabled_is_always_valid() {
        let config = GcmConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gcm_config_valid_when_enabled() {
        let config = GcmConfig {
            enabled: true,
            api_key: "server-key".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gcm_config_missing_api_key() {
        let config = GcmConfig {
            enabled: true,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.api_key")
        );
    }

    #[test]
    fn test_gcm_config_invalid_api_url() {
        let config = GcmConfig {
            enabled: true,
            api_url: "ftp://example.com".to_string(),
            api_key: "server-key".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.api_url")
        );
    }

    #[test]
    fn test_gcm_config_zero_batch_size() {
        let config = GcmConfig {
            enabled: true,
            api_key: "server-key".to_string(),
            batch_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.batch_size")
        );
    }

    // ========================================================================
    // ApnsConfig validation tests
    // ========================================================================

    #[test]
    fn test_apns_config_disabled_is_always_valid() {
        let config = ApnsConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apns_config_valid_when_enabled() {
        let config = ApnsConfig {
            enabled: true,
            certificate_path: "certs/apns.pem".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apns_config_invalid_environment() {
        let config = ApnsConfig {
            enabled: true,
            environment: "testing".to_string(),
            certificate_path: "certs/apns.pem".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "apns.environment")
        );
    }

    #[test]
    fn test_apns_config_missing_certificate() {
        let config = ApnsConfig {
            enabled: true,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "apns.certificate_path")
        );
    }

    // ========================================================================
    // BlackberryConfig validation tests
    // ========================================================================

    #[test]
    fn test_blackberry_config_disabled_is_always_valid() {
        let config = BlackberryConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blackberry_config_valid_when_enabled() {
        let config = BlackberryConfig {
            enabled: true,
            application_id: "app-123".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blackberry_config_missing_credentials() {
        let config = BlackberryConfig {
            enabled: true,
            application_id: "app-123".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "blackberry.password")
        );
    }

    #[test]
    fn test_blackberry_config_zero_deadline() {
        let config = BlackberryConfig {
            enabled: true,
            application_id: "app-123".to_string(),
            password: "secret".to_string(),
            deliver_before_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "blackberry.deliver_before_secs")
        );
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid() {
        let settings = LoggerSettings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_logger_settings_valid_levels() {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "INFO", "Debug"];

        for level in valid_levels {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(
                settings.validate().is_ok(),
                "Level should be valid: {}",
                level
            );
        }
    }

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: "invalid".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.level")
        );
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.format")
        );
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_default_is_valid() {
        // All gateways default to disabled, so no credentials are required.
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_invalid_gateway_section() {
        let settings = Settings {
            gcm: GcmConfig {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.api_key")
        );
    }

    #[test]
    fn test_settings_invalid_logger() {
        let settings = Settings {
            logger: LoggerSettings {
                level: "invalid".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.level")
        );
    }
}
