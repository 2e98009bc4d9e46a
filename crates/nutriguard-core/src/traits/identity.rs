// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary to the external identity provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NutriguardError;

/// Email/password identity service that owns credentials and sessions.
///
/// The data layer only ever sees the verified identity id it returns, which
/// is stored as `UserProfile::auth_id`.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Registers a new identity and returns its id.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, NutriguardError>;

    /// Verifies credentials, starts a session and returns the identity id.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, NutriguardError>;

    /// Returns the identity of the current session, if any.
    async fn current_identity(&self) -> Result<Option<Uuid>, NutriguardError>;

    /// Sends a password reset message to the given address.
    async fn send_password_reset(&self, email: &str) -> Result<(), NutriguardError>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), NutriguardError>;

    /// Removes an identity, ending its session if it is the current one.
    async fn delete_identity(&self, id: Uuid) -> Result<(), NutriguardError>;
}
