// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::NutriguardConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &NutriguardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::InvalidSetting {
            key: "storage.database_path",
            reason: "must not be empty",
            hint: "use a file path, or `:memory:` for a private in-memory database",
        });
    }

    if config.storage.busy_timeout_ms == 0 {
        errors.push(ConfigError::InvalidSetting {
            key: "storage.busy_timeout_ms",
            reason: "must be greater than 0",
            hint: "the default of 5000 waits up to five seconds on a locked database",
        });
    }

    if config.storage.is_in_memory() && config.storage.wal_mode {
        errors.push(ConfigError::InvalidSetting {
            key: "storage.wal_mode",
            reason: "cannot be enabled for an in-memory database",
            hint: "set `wal_mode = false` or point `database_path` at a file",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
