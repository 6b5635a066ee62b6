// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the devmatch configuration system.

use devmatch_config::diagnostic::ConfigError;
use devmatch_config::model::CronTimezone;
use devmatch_config::{load_and_validate_str, load_config_from_str};

/// A file touching every section deserializes into the expected values.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
bind_address = "0.0.0.0"
port = 9000
log_level = "debug"

[embedding]
queue_size = 500
workers = 8
rpc_address = "http://embedder:50051"

[recommendation]
queue_size = 50
workers = 1
rpc_address = "http://recommender:50052"
max_attempts = 5

[chat]
broadcast_buffer = 64
client_buffer = 16

[scheduler]
trial_cron = "30 8 * * *"
timezone = "utc"

[storage]
database_path = "/tmp/devmatch.db"

[email]
enabled = true
smtp_host = "smtp.example.com"
from_address = "Devmatch <noreply@example.com>"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.embedding.queue_size, 500);
    assert_eq!(config.embedding.workers, 8);
    assert_eq!(config.embedding.rpc_address, "http://embedder:50051");
    assert_eq!(config.recommendation.max_attempts, 5);
    assert_eq!(config.chat.broadcast_buffer, 64);
    assert_eq!(config.chat.client_buffer, 16);
    assert_eq!(config.scheduler.trial_cron, "30 8 * * *");
    assert_eq!(config.scheduler.timezone, CronTimezone::Utc);
    assert_eq!(config.storage.database_path, "/tmp/devmatch.db");
    assert!(config.email.enabled);
    assert_eq!(config.email.smtp_port, 587);
}

/// Sections left out fall back to their defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("[embedding]\nworkers = 2\n").unwrap();
    assert_eq!(config.embedding.workers, 2);
    assert_eq!(config.embedding.queue_size, 100);
    assert_eq!(config.recommendation.workers, 2);
    assert_eq!(config.scheduler.trial_cron, "0 9 * * *");
    assert_eq!(config.chat.broadcast_buffer, 256);
}

/// A typo inside a section yields an UnknownKey diagnostic with a suggestion.
#[test]
fn typo_produces_unknown_key_with_suggestion() {
    let toml = r#"
[embedding]
wrokers = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "wrokers"
                && suggestion.as_deref() == Some("workers")
                && valid_keys.contains("rpc_address")
        })
    });
    assert!(found, "expected UnknownKey for `wrokers`, got: {errors:?}");
}

/// A string where a number is expected is reported as a type error.
#[test]
fn invalid_type_is_reported() {
    let err = load_config_from_str("[chat]\nclient_buffer = \"lots\"\n")
        .expect_err("should reject invalid type");
    let err_str = err.to_string();
    assert!(
        err_str.contains("invalid type") || err_str.contains("client_buffer"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let errors = load_and_validate_str("[scheduler]\ntrial_cron = \"not a cron\"\n")
        .expect_err("bad cron should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("trial_cron"))
    ));
}

/// Diagnostics render through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "wrokers".to_string(),
        suggestion: Some("workers".to_string()),
        valid_keys: "queue_size, workers, rpc_address".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    assert!(
        error
            .help()
            .map(|h| h.to_string())
            .unwrap_or_default()
            .contains("did you mean `workers`")
    );

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("wrokers"));
}

/// `DEVMATCH_*` variables override the file and pass validation.
#[test]
fn environment_overrides_pass_validation() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("devmatch.toml", "[embedding]\nworkers = 2\n")?;
        jail.set_env("DEVMATCH_EMBEDDING_WORKERS", "8");
        jail.set_env("DEVMATCH_EMBEDDING_RPC_ADDRESS", "http://embedder:50051");
        jail.set_env("DEVMATCH_CHAT_CLIENT_BUFFER", "32");

        let config = devmatch_config::load_and_validate_path(std::path::Path::new("devmatch.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.embedding.workers, 8);
        assert_eq!(config.embedding.rpc_address, "http://embedder:50051");
        assert_eq!(config.chat.client_buffer, 32);
        Ok(())
    });
}
