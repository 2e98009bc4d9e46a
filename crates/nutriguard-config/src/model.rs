// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `deny_unknown_fields` so typos in TOML keys are reported
//! instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level NutriGuard configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NutriguardConfig {
    /// Relational backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl NutriguardConfig {
    /// Render the configuration as a `nutriguard.toml` document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// SQLite backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a connection waits on a locked database, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StorageConfig {
    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database_path: IN_MEMORY_PATH.to_string(),
            wal_mode: false,
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY_PATH
    }
}

/// SQLite's name for a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("nutriguard").join("nutriguard.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("nutriguard.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_storage_uses_wal_and_data_dir() {
        let config = StorageConfig::default();
        assert!(config.wal_mode);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(config.database_path.ends_with("nutriguard.db"));
    }

    #[test]
    fn rendered_toml_lists_storage_keys() {
        let rendered = NutriguardConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[storage]"));
        assert!(rendered.contains("busy_timeout_ms = 5000"));
    }

    #[test]
    fn in_memory_disables_wal() {
        let config = StorageConfig::in_memory();
        assert!(config.is_in_memory());
        assert!(!config.wal_mode);
    }
}
