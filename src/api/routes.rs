//! API route handlers

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::auth::models::{AccountInfo, CreatePatientRequest};
use crate::auth::{AuthError, AuthenticatedPrincipal, LoginRequest, LoginResponse, Role, SecurityContext};
use crate::error::{Error, Result};

/// Response envelope: `{"message": ..., "data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Informational message with `data: null`
    pub fn empty(message: impl Into<String>) -> Self {
        ApiResponse {
            message: message.into(),
            data: None,
        }
    }

    /// Error message with `data: null`
    pub fn err(message: impl Into<String>) -> Self {
        Self::empty(message)
    }
}

/// Run bcrypt and store work off the async workers
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("blocking task failed: {}", e)))
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::empty("healthy"))
}

// Public routes

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let principal = {
        let state = state.clone();
        blocking(move || state.authenticator.authenticate(&req.email, &req.password)).await??
    };

    let token = state.codec.issue(&principal)?;

    Ok(Json(ApiResponse::ok(
        "Login success",
        LoginResponse {
            id: principal.id,
            token: token.into_string(),
        },
    )))
}

pub async fn create_patient(
    State(state): State<SharedState>,
    Json(req): Json<CreatePatientRequest>,
) -> Result<Json<ApiResponse<AccountInfo>>> {
    let principal = {
        let state = state.clone();
        let email = req.email.clone();
        let password = req.password;
        blocking(move || state.authenticator.register_patient(&email, &password)).await??
    };

    let mut info = AccountInfo::from(&principal);
    info.first_name = Some(req.first_name);
    info.last_name = Some(req.last_name);
    info.phone_number = req.phone_number;

    Ok(Json(ApiResponse::ok("Patient created", info)))
}

// Protected routes

pub async fn me(
    ctx: SecurityContext,
) -> std::result::Result<Json<ApiResponse<AuthenticatedPrincipal>>, AuthError> {
    let principal = ctx.require_authenticated()?;
    Ok(Json(ApiResponse::ok("Authenticated", principal.clone())))
}

pub async fn admin_only(
    ctx: SecurityContext,
) -> std::result::Result<Json<ApiResponse<AuthenticatedPrincipal>>, AuthError> {
    let principal = ctx.require_role(Role::Admin)?;
    Ok(Json(ApiResponse::ok("Admin access granted", principal.clone())))
}
