// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base lifecycle trait shared by every backend.

use async_trait::async_trait;

use crate::error::NutriguardError;
use crate::types::HealthStatus;

/// Identity, health and shutdown for a backend instance.
///
/// A backend is constructed once at application start and handed to every
/// consumer explicitly, usually as `Arc<dyn InventoryStore>`.
#[async_trait]
pub trait BackendAdapter: Send + Sync + 'static {
    /// Returns the short name of this backend (e.g. "sqlite", "memory").
    fn name(&self) -> &str;

    /// Returns the semantic version of this backend.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, NutriguardError>;

    /// Gracefully shuts down the backend, releasing any held resources.
    async fn shutdown(&self) -> Result<(), NutriguardError>;
}
