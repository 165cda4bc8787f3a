//! Access gate: bearer token extraction, verification and route policy

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::auth::context::SecurityContext;
use crate::auth::entry_point::AuthenticationEntryPoint;
use crate::auth::jwt::{TokenCodec, TokenError};
use crate::auth::policy::{Requirement, RouteAuthorizationPolicy};

const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Protected route and no usable token
    MissingAuthentication,
    /// Protected route and the presented token failed verification
    InvalidToken(TokenError),
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingAuthentication => "no bearer token",
            Rejection::InvalidToken(TokenError::Malformed) => "malformed token",
            Rejection::InvalidToken(TokenError::BadSignature) => "bad token signature",
            Rejection::InvalidToken(TokenError::Expired) => "expired token",
        }
    }
}

/// Outcome of running a request through the gate
#[derive(Debug, Clone)]
pub enum GateDecision {
    Dispatch(SecurityContext),
    Reject(Rejection),
}

/// Runs every request through token extraction, token verification and
/// the route policy, in that order. Any stage can end the request.
pub struct AccessGate {
    codec: Arc<TokenCodec>,
    policy: Arc<RouteAuthorizationPolicy>,
    entry_point: AuthenticationEntryPoint,
}

impl AccessGate {
    pub fn new(codec: Arc<TokenCodec>, policy: Arc<RouteAuthorizationPolicy>) -> Self {
        Self {
            codec,
            policy,
            entry_point: AuthenticationEntryPoint,
        }
    }

    pub fn policy(&self) -> &RouteAuthorizationPolicy {
        &self.policy
    }

    pub fn inspect(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        self.inspect_at(path, headers, Utc::now())
    }

    pub fn inspect_at(&self, path: &str, headers: &HeaderMap, now: DateTime<Utc>) -> GateDecision {
        let requirement = self.policy.requirement_for(path);
        let mut ctx = SecurityContext::empty();

        // Token stage
        if let Some(token) = bearer_token(headers) {
            match self.codec.verify_at(token, now) {
                Ok(claims) => {
                    // Fresh context, cannot already be set
                    let _ = ctx.set(claims.into());
                }
                Err(e) if requirement == Requirement::Authenticated => {
                    return GateDecision::Reject(Rejection::InvalidToken(e));
                }
                Err(e) => {
                    tracing::debug!(%path, "Ignoring invalid token on public route: {}", e);
                }
            }
        }

        // Policy stage
        if requirement == Requirement::Authenticated && !ctx.is_authenticated() {
            return GateDecision::Reject(Rejection::MissingAuthentication);
        }

        GateDecision::Dispatch(ctx)
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware installing the gate in front of every handler
pub async fn access_gate(
    State(gate): State<Arc<AccessGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    match gate.inspect(&path, req.headers()) {
        GateDecision::Dispatch(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        GateDecision::Reject(rejection) => {
            gate.entry_point
                .on_rejected(req.method().as_str(), &path, rejection.reason())
        }
    }
}
