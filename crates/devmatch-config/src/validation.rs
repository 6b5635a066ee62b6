// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero pool sizes, well-formed RPC endpoints, and parseable cron
//! expressions.

use croner::Cron;

use crate::diagnostic::ConfigError;
use crate::model::DevmatchConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error instead of failing fast.
pub fn validate_config(config: &DevmatchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.trim().is_empty() {
        errors.push(ConfigError::validation(
            "server.bind_address must not be empty",
        ));
    }

    for (section, queue_size, workers, rpc_address) in [
        (
            "embedding",
            config.embedding.queue_size,
            config.embedding.workers,
            &config.embedding.rpc_address,
        ),
        (
            "recommendation",
            config.recommendation.queue_size,
            config.recommendation.workers,
            &config.recommendation.rpc_address,
        ),
    ] {
        if queue_size == 0 {
            errors.push(ConfigError::validation(format!(
                "{section}.queue_size must be at least 1"
            )));
        }
        if workers == 0 {
            errors.push(ConfigError::validation(format!(
                "{section}.workers must be at least 1"
            )));
        }
        let address = rpc_address.trim();
        if address.is_empty() {
            errors.push(ConfigError::validation(format!(
                "{section}.rpc_address must not be empty"
            )));
        } else if !(address.starts_with("http://") || address.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{section}.rpc_address `{address}` must start with http:// or https://"
            )));
        }
    }

    if config.embedding.rpc_timeout_secs == 0 || config.recommendation.rpc_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "rpc_timeout_secs must be at least 1",
        ));
    }

    if config.recommendation.max_attempts == 0 {
        errors.push(ConfigError::validation(
            "recommendation.max_attempts must be at least 1",
        ));
    }

    if config.chat.broadcast_buffer == 0 {
        errors.push(ConfigError::validation(
            "chat.broadcast_buffer must be at least 1",
        ));
    }
    if config.chat.client_buffer == 0 {
        errors.push(ConfigError::validation(
            "chat.client_buffer must be at least 1",
        ));
    }

    if let Err(e) = config.scheduler.trial_cron.parse::<Cron>() {
        errors.push(ConfigError::validation(format!(
            "scheduler.trial_cron `{}` is not a valid cron expression: {e}",
            config.scheduler.trial_cron
        )));
    }

    if config.scheduler.reminder_window_hours == 0 {
        errors.push(ConfigError::validation(
            "scheduler.reminder_window_hours must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.email.enabled {
        if config.email.smtp_host.as_deref().is_none_or(str::is_empty) {
            errors.push(ConfigError::validation(
                "email.smtp_host is required when email.enabled = true",
            ));
        }
        if config.email.from_address.as_deref().is_none_or(str::is_empty) {
            errors.push(ConfigError::validation(
                "email.from_address is required when email.enabled = true",
            ));
        }
    }
    if config.email.queue_size == 0 {
        errors.push(ConfigError::validation(
            "email.queue_size must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&DevmatchConfig::default()).is_ok());
    }

    #[test]
    fn zero_workers_fails_validation() {
        let mut config = DevmatchConfig::default();
        config.embedding.workers = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "embedding.workers"));
    }

    #[test]
    fn zero_queue_size_fails_validation() {
        let mut config = DevmatchConfig::default();
        config.recommendation.queue_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "recommendation.queue_size"));
    }

    #[test]
    fn rpc_address_without_scheme_fails_validation() {
        let mut config = DevmatchConfig::default();
        config.embedding.rpc_address = "localhost:50051".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "must start with http://"));
    }

    #[test]
    fn bad_cron_fails_validation() {
        let mut config = DevmatchConfig::default();
        config.scheduler.trial_cron = "every morning".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "scheduler.trial_cron"));
    }

    #[test]
    fn enabled_email_requires_host_and_sender() {
        let mut config = DevmatchConfig::default();
        config.email.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "email.smtp_host"));
        assert!(has_error(&errors, "email.from_address"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = DevmatchConfig::default();
        config.embedding.workers = 0;
        config.chat.client_buffer = 0;
        config.scheduler.reminder_window_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
