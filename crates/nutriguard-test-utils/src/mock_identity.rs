// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock identity provider for deterministic account tests.
//!
//! `MockIdentityProvider` implements [`IdentityProvider`] over an in-memory
//! credential table, and records password reset requests so tests can
//! assert on them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use nutriguard_core::{IdentityProvider, NutriguardError};

/// Shortest password the mock accepts on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default)]
struct State {
    /// email -> (password, identity id)
    accounts: HashMap<String, (String, Uuid)>,
    session: Option<Uuid>,
    reset_requests: Vec<String>,
}

fn identity_error(message: &str) -> NutriguardError {
    NutriguardError::Identity {
        message: message.to_string(),
        source: None,
    }
}

/// An identity provider that keeps accounts in memory.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<State>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Email addresses that requested a password reset, oldest first.
    pub async fn reset_requests(&self) -> Vec<String> {
        self.state.lock().await.reset_requests.clone()
    }

    /// Number of registered identities.
    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, NutriguardError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(identity_error("invalid email address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(identity_error("password is too short"));
        }
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&email) {
            return Err(identity_error("email is already registered"));
        }
        let id = Uuid::new_v4();
        state.accounts.insert(email, (password.to_string(), id));
        state.session = Some(id);
        Ok(id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, NutriguardError> {
        let email = email.trim().to_lowercase();
        let mut state = self.state.lock().await;
        let id = match state.accounts.get(&email) {
            Some((stored, id)) if stored == password => *id,
            _ => return Err(identity_error("invalid login credentials")),
        };
        state.session = Some(id);
        Ok(id)
    }

    async fn current_identity(&self) -> Result<Option<Uuid>, NutriguardError> {
        Ok(self.state.lock().await.session)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), NutriguardError> {
        self.state
            .lock()
            .await
            .reset_requests
            .push(email.trim().to_lowercase());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), NutriguardError> {
        self.state.lock().await.session = None;
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), NutriguardError> {
        let mut state = self.state.lock().await;
        let before = state.accounts.len();
        state.accounts.retain(|_, (_, account)| *account != id);
        if state.accounts.len() == before {
            return Err(identity_error("unknown identity"));
        }
        if state.session == Some(id) {
            state.session = None;
        }
        Ok(())
    }
}
