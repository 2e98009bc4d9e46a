// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account flow for NutriGuard.
//!
//! [`AccountService`] ties an external [`IdentityProvider`] to the profile rows
//! of an [`InventoryStore`]: signing up creates an identity, a personal cart
//! and a profile; signing in resolves the identity back to its profile.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use nutriguard_core::{Cart, IdentityProvider, InventoryStore, NutriguardError, UserProfile};

/// Errors returned by [`AccountService`].
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("username must not be empty")]
    InvalidUsername,

    /// The username belongs to an existing profile. Anything created for the
    /// attempt has been removed again.
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),

    /// The identity is valid but no profile references it.
    #[error("no profile is linked to this account")]
    ProfileNotFound,

    /// The cart or profile could not be stored. The identity and cart created
    /// for the attempt have been removed again.
    #[error("could not store {0}")]
    Persistence(&'static str),

    #[error(transparent)]
    Identity(#[from] NutriguardError),
}

/// Sign-up, sign-in and session helpers over injected collaborators.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn InventoryStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountService {
    pub fn new(store: Arc<dyn InventoryStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Register a new account and its profile.
    ///
    /// The returned profile is the stored row; its personal cart is empty.
    /// When another sign-up claims the username first, the insert loses on
    /// the unique username and the attempt reports `UsernameTaken`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<UserProfile, AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::InvalidUsername);
        }
        if self.store.get_user_basic(username).await.is_some() {
            return Err(AccountError::UsernameTaken(username.to_string()));
        }

        let auth_id = self.identity.sign_up(email, password).await?;
        let Some(cart) = self.store.create_cart(&Cart::new()).await else {
            self.discard_identity(auth_id).await;
            return Err(AccountError::Persistence("personal cart"));
        };

        let mut profile = UserProfile::new(username, cart.id);
        profile.auth_id = Some(auth_id);
        let Some(profile) = self.store.create_user(&profile).await else {
            if !self.store.delete_cart(cart.id).await {
                warn!(cart_id = %cart.id, "could not remove personal cart of failed sign-up");
            }
            self.discard_identity(auth_id).await;
            if self.store.get_user_basic(username).await.is_some() {
                return Err(AccountError::UsernameTaken(username.to_string()));
            }
            return Err(AccountError::Persistence("profile"));
        };

        info!(username = %profile.username, "account created");
        Ok(profile)
    }

    async fn discard_identity(&self, auth_id: Uuid) {
        if let Err(error) = self.identity.delete_identity(auth_id).await {
            warn!(%auth_id, error = %error, "could not remove identity of failed sign-up");
        }
    }

    /// Sign in and return the fully hydrated profile.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, AccountError> {
        let auth_id = self.identity.sign_in(email, password).await?;
        let profile = self
            .store
            .get_user_by_auth_id(auth_id)
            .await
            .ok_or(AccountError::ProfileNotFound)?;
        debug!(username = %profile.username, "signed in");
        Ok(profile)
    }

    /// Profile of the current session, if one is active.
    pub async fn current_profile(&self) -> Result<Option<UserProfile>, AccountError> {
        let Some(auth_id) = self.identity.current_identity().await? else {
            return Ok(None);
        };
        Ok(self.store.get_user_by_auth_id(auth_id).await)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AccountError> {
        self.identity.send_password_reset(email).await?;
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), AccountError> {
        self.identity.sign_out().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriguard_test_utils::{MemoryStore, MockIdentityProvider};
    use tracing_test::traced_test;

    fn service() -> (AccountService, Arc<MemoryStore>, MockIdentityProvider) {
        let store = Arc::new(MemoryStore::new());
        let identity = MockIdentityProvider::new();
        let service = AccountService::new(store.clone(), Arc::new(identity.clone()));
        (service, store, identity)
    }

    #[traced_test]
    #[tokio::test]
    async fn sign_up_creates_identity_cart_and_profile() {
        let (service, store, identity) = service();
        let profile = service
            .sign_up("alice@example.com", "secret123", "  alice ")
            .await
            .unwrap();

        assert_eq!(profile.username, "alice");
        assert!(profile.auth_id.is_some());
        assert!(store.get_cart(profile.personal_cart_id).await.is_some());
        assert_eq!(identity.account_count().await, 1);
        assert!(logs_contain("account created"));
    }

    #[tokio::test]
    async fn taken_username_is_rejected_before_identity_creation() {
        let (service, _store, identity) = service();
        service.sign_up("a@example.com", "secret123", "alice").await.unwrap();

        let err = service
            .sign_up("b@example.com", "secret123", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken(name) if name == "alice"));
        assert_eq!(identity.account_count().await, 1);
    }

    #[tokio::test]
    async fn blank_username_is_invalid() {
        let (service, _, identity) = service();
        let err = service.sign_up("a@example.com", "secret123", "   ").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidUsername));
        assert_eq!(identity.account_count().await, 0);
    }

    #[tokio::test]
    async fn identity_errors_are_propagated() {
        let (service, store, _) = service();
        let err = service.sign_up("a@example.com", "short", "alice").await.unwrap_err();
        assert!(matches!(err, AccountError::Identity(_)));
        assert!(store.get_user_basic("alice").await.is_none());
    }

    #[tokio::test]
    async fn sign_in_returns_full_profile() {
        let (service, store, _) = service();
        let alice = service.sign_up("a@example.com", "secret123", "alice").await.unwrap();
        service.sign_out().await.unwrap();
        assert!(service.current_profile().await.unwrap().is_none());

        let item = store
            .create_food_item(&nutriguard_core::FoodItem::new("Apple"))
            .await
            .unwrap();
        store.add_item_to_cart(alice.personal_cart_id, item.id).await;

        let signed_in = service.sign_in("a@example.com", "secret123").await.unwrap();
        assert_eq!(signed_in.id, alice.id);
        assert_eq!(signed_in.personal_cart.len(), 1);
        let current = service.current_profile().await.unwrap().unwrap();
        assert_eq!(current.username, "alice");
    }

    #[tokio::test]
    async fn identity_without_profile_is_reported() {
        let (service, _, identity) = service();
        identity.sign_up("ghost@example.com", "secret123").await.unwrap();
        let err = service.sign_in("ghost@example.com", "secret123").await.unwrap_err();
        assert!(matches!(err, AccountError::ProfileNotFound));
    }

    #[tokio::test]
    async fn password_reset_delegates_to_provider() {
        let (service, _, identity) = service();
        service.send_password_reset("a@example.com").await.unwrap();
        assert_eq!(identity.reset_requests().await, vec!["a@example.com"]);
    }
}
