// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the NutriGuard inventory data layer.

use thiserror::Error;

/// The primary error type used across backend lifecycles, query modules and
/// external collaborator boundaries.
///
/// [`InventoryStore`](crate::InventoryStore) operations never surface this
/// type to callers: backends log it at the operation boundary and answer with
/// `None`, `false` or an empty list instead.
#[derive(Debug, Error)]
pub enum NutriguardError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A backend was used before `initialize()` completed.
    #[error("{backend} backend is not initialized")]
    NotInitialized { backend: String },

    /// Identity provider errors (sign-up rejected, bad credentials, transport).
    #[error("identity provider error: {message}")]
    Identity {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NutriguardError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}
