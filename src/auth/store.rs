//! Credential storage

use std::collections::HashMap;
use std::sync::RwLock;

use crate::auth::error::AuthError;
use crate::auth::models::Principal;

/// Lookup of stored accounts by login email
pub trait CredentialStore: Send + Sync {
    /// Find an account by email, `Ok(None)` when it does not exist
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthError>;

    /// Add a new account, failing if the email is taken
    fn insert(&self, principal: Principal) -> Result<(), AuthError>;
}

/// Process-local store keyed by email
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, Principal>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of accounts, rejecting duplicate emails
    pub fn with_accounts(
        accounts: impl IntoIterator<Item = Principal>,
    ) -> Result<Self, AuthError> {
        let store = Self::new();
        for principal in accounts {
            store.insert(principal)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AuthError::Store("account map lock poisoned".to_string()))?;
        Ok(accounts.get(email).cloned())
    }

    fn insert(&self, principal: Principal) -> Result<(), AuthError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AuthError::Store("account map lock poisoned".to_string()))?;

        if accounts.contains_key(&principal.email) {
            return Err(AuthError::AlreadyExists(principal.email));
        }
        accounts.insert(principal.email.clone(), principal);
        Ok(())
    }
}
