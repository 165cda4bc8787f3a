//! Authentication and authorization
//!
//! Password hashing, session tokens, the per-request access gate and the
//! route policy it consults.

pub mod authenticator;
pub mod context;
pub mod entry_point;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod store;

pub use authenticator::Authenticator;
pub use context::SecurityContext;
pub use entry_point::AuthenticationEntryPoint;
pub use error::AuthError;
pub use jwt::{ClaimSet, SessionToken, TokenCodec, TokenError};
pub use middleware::{access_gate, AccessGate, GateDecision, Rejection};
pub use models::{AuthenticatedPrincipal, LoginRequest, LoginResponse, Principal, Role};
pub use password::PasswordHasher;
pub use policy::{Requirement, RouteAuthorizationPolicy};
pub use store::{CredentialStore, InMemoryCredentialStore};
