//! Authentication failures and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ApiResponse;
use crate::auth::entry_point::AuthenticationEntryPoint;
use crate::auth::models::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never told apart
    #[error("Bad credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Missing required role {0}")]
    InsufficientRole(Role),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Credential store error: {0}")]
    Store(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::err("Bad credentials")),
            )
                .into_response(),
            AuthError::Unauthenticated | AuthError::InsufficientRole(_) => {
                AuthenticationEntryPoint.unauthorized()
            }
            AuthError::AlreadyExists(_) => (
                StatusCode::CONFLICT,
                Json(ApiResponse::err("User already exists")),
            )
                .into_response(),
            AuthError::WeakPassword(message) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response()
            }
            AuthError::Store(e) => {
                tracing::error!("Credential store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::err("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
