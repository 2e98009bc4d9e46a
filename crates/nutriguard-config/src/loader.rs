// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./nutriguard.toml` > `~/.config/nutriguard/nutriguard.toml`
//! > `/etc/nutriguard/nutriguard.toml`, with environment variable overrides via
//! the `NUTRIGUARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NutriguardConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/nutriguard/nutriguard.toml";
pub(crate) const LOCAL_CONFIG: &str = "nutriguard.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nutriguard").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nutriguard/nutriguard.toml`
/// 3. `~/.config/nutriguard/nutriguard.toml`
/// 4. `./nutriguard.toml`
/// 5. `NUTRIGUARD_*` environment variables
pub fn load_config() -> Result<NutriguardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<NutriguardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NutriguardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NutriguardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NutriguardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NutriguardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `NUTRIGUARD_STORAGE_DATABASE_PATH`
/// must become `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("NUTRIGUARD_").map(|key| key.as_str().replacen("storage_", "storage.", 1).into())
}
