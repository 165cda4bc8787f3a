//! Credential checking and account registration

use std::sync::Arc;

use crate::auth::error::AuthError;
use crate::auth::models::{Principal, Role};
use crate::auth::password::PasswordHasher;
use crate::auth::store::CredentialStore;
use crate::error::Result;

const MIN_PASSWORD_LEN: usize = 8;

/// Verifies email/password pairs against the credential store
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    /// Compared against when the email is unknown, so both failure paths pay for a bcrypt round
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Result<Self> {
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    /// Check a login attempt.
    ///
    /// An unknown email, a wrong password and a store failure all produce
    /// `AuthError::InvalidCredentials`.
    pub fn authenticate(&self, email: &str, password: &str) -> std::result::Result<Principal, AuthError> {
        let principal = match self.store.find_by_email(email) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Credential lookup failed: {}", e);
                None
            }
        };

        let Some(principal) = principal else {
            let _ = self.hasher.verify(password, &self.dummy_hash);
            tracing::info!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &principal.password_hash) {
            tracing::info!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(principal = %principal.id, "Login succeeded");
        Ok(principal)
    }

    /// Create a patient account with a freshly hashed password
    pub fn register_patient(&self, email: &str, password: &str) -> std::result::Result<Principal, AuthError> {
        check_password_strength(password)?;

        let hash = self.hasher.hash(password).map_err(|e| AuthError::Store(e.to_string()))?;
        let principal = Principal::new(uuid::Uuid::new_v4().to_string(), email, hash, [Role::Patient])
            .map_err(|e| AuthError::Store(e.to_string()))?;

        self.store.insert(principal.clone())?;
        tracing::info!(principal = %principal.id, "Registered patient account");
        Ok(principal)
    }
}

/// At least eight characters including one digit
fn check_password_strength(password: &str) -> std::result::Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters with one number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::InMemoryCredentialStore;

    fn authenticator() -> Authenticator {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("correct1pass").unwrap();
        let store = InMemoryCredentialStore::with_accounts([Principal::new(
            "7",
            "real@x.com",
            hash,
            [Role::Doctor],
        )
        .unwrap()])
        .unwrap();
        Authenticator::new(Arc::new(store), hasher).unwrap()
    }

    #[test]
    fn test_authenticate_success() {
        let principal = authenticator()
            .authenticate("real@x.com", "correct1pass")
            .expect("should authenticate");
        assert_eq!(principal.id, "7");
        assert!(principal.has_role(Role::Doctor));
    }

    #[test]
    fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let auth = authenticator();
        let unknown = auth.authenticate("unknown@x.com", "anything");
        let wrong = auth.authenticate("real@x.com", "wrongpass");
        assert_eq!(unknown.unwrap_err(), AuthError::InvalidCredentials);
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[test]
    fn test_register_patient() {
        let auth = authenticator();
        let principal = auth.register_patient("new@x.com", "password1").unwrap();
        assert!(principal.has_role(Role::Patient));
        assert_ne!(principal.password_hash, "password1");

        let logged_in = auth.authenticate("new@x.com", "password1").unwrap();
        assert_eq!(logged_in.id, principal.id);
    }

    #[test]
    fn test_register_duplicate_email() {
        let result = authenticator().register_patient("real@x.com", "password1");
        assert_eq!(result.unwrap_err(), AuthError::AlreadyExists("real@x.com".to_string()));
    }

    #[test]
    fn test_register_weak_password() {
        let auth = authenticator();
        assert!(matches!(
            auth.register_patient("a@x.com", "short1"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register_patient("a@x.com", "nodigitshere"),
            Err(AuthError::WeakPassword(_))
        ));
    }
}
