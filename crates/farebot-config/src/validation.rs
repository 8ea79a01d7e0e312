// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects all errors rather than failing fast.

use crate::diagnostic::ConfigError;
use crate::model::FarebotConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &FarebotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.bot.log_level
            ),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.broadcast.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "broadcast.batch_size must be at least 1".to_string(),
        });
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&FarebotConfig::default()).is_ok());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = FarebotConfig::default();
        config.bot.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("log_level")));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = FarebotConfig::default();
        config.broadcast.batch_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("batch_size"));
    }

    #[test]
    fn rejects_empty_host_and_collects_all_errors() {
        let mut config = FarebotConfig::default();
        config.gateway.host = "  ".into();
        config.storage.database_path = "".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_blank_bot_token() {
        let mut config = FarebotConfig::default();
        config.telegram.bot_token = Some("   ".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn deserialized_toml_passes_validation() {
        let toml_str = r#"
            [bot]
            log_level = "debug"

            [telegram]
            bot_token = "123:abc"

            [broadcast]
            batch_size = 5
        "#;
        let config: FarebotConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.broadcast.batch_size, 5);
    }

    #[test]
    fn deserialized_toml_still_hits_semantic_checks() {
        let toml_str = r#"
            [gateway]
            host = ""
        "#;
        let config: FarebotConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("host"));
    }
}
