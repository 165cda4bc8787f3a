//! Per-request security context

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::error::AuthError;
use crate::auth::models::{AuthenticatedPrincipal, Role};

/// Holder of the principal authenticated for one request.
///
/// Starts empty and can be set once. The access gate stores it in the
/// request extensions; handlers take it as an extractor.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<AuthenticatedPrincipal>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the principal. A second call is refused and hands the value back.
    pub fn set(&mut self, principal: AuthenticatedPrincipal) -> Result<(), AuthenticatedPrincipal> {
        if self.principal.is_some() {
            return Err(principal);
        }
        self.principal = Some(principal);
        Ok(())
    }

    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The principal, or `Unauthenticated`
    pub fn require_authenticated(&self) -> Result<&AuthenticatedPrincipal, AuthError> {
        self.principal.as_ref().ok_or(AuthError::Unauthenticated)
    }

    /// Handler-level guard for a single role
    pub fn require_role(&self, role: Role) -> Result<&AuthenticatedPrincipal, AuthError> {
        let principal = self.require_authenticated()?;
        if principal.has_role(role) {
            Ok(principal)
        } else {
            Err(AuthError::InsufficientRole(role))
        }
    }
}

impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default())
    }
}
