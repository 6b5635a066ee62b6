// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./devmatch.toml` > `~/.config/devmatch/devmatch.toml` >
//! `/etc/devmatch/devmatch.toml` with environment variable overrides via `DEVMATCH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DevmatchConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/devmatch/devmatch.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "devmatch.toml";

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "server",
    "embedding",
    "recommendation",
    "chat",
    "scheduler",
    "storage",
    "email",
];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("devmatch").join("devmatch.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/devmatch/devmatch.toml`
/// 3. `~/.config/devmatch/devmatch.toml`
/// 4. `./devmatch.toml`
/// 5. `DEVMATCH_*` environment variables
pub fn load_config() -> Result<DevmatchConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DevmatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DevmatchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DevmatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DevmatchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the default lookup, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(DevmatchConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `DEVMATCH_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `DEVMATCH_EMBEDDING_RPC_ADDRESS` maps to `embedding.rpc_address`.
fn env_provider() -> Env {
    Env::prefixed("DEVMATCH_").map(|key| map_env_key(key.as_str()).into())
}

// Keys arrive with their original case, `EMBEDDING_WORKERS`.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
