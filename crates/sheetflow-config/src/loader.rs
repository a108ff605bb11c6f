// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sheetflow.toml` over
//! `~/.config/sheetflow/sheetflow.toml` over `/etc/sheetflow/sheetflow.toml`,
//! with environment variable overrides via the `SHEETFLOW_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SheetflowConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sheetflow/sheetflow.toml";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sheetflow.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sheetflow").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sheetflow/sheetflow.toml` (system-wide)
/// 3. `~/.config/sheetflow/sheetflow.toml` (user XDG config)
/// 4. `./sheetflow.toml` (local directory)
/// 5. `SHEETFLOW_*` environment variables
pub fn load_config() -> Result<SheetflowConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SheetflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SheetflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SheetflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SheetflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SheetflowConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SHEETFLOW_CACHE_TTL_SECS` must map to `cache.ttl_secs`, not
/// `cache.ttl.secs`.
fn env_provider() -> Env {
    Env::prefixed("SHEETFLOW_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["agent", "sheets", "cache", "completion", "history", "schedule"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
