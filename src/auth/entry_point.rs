//! Unauthorized response contract

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::ApiResponse;

/// Body message for every rejected request
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Renders the 401 returned whenever the gate or a guard refuses a request.
///
/// The body is always `{"message": "Unauthorized", "data": null}`; the
/// reason only reaches the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationEntryPoint;

impl AuthenticationEntryPoint {
    pub fn on_rejected(&self, method: &str, path: &str, reason: &str) -> Response {
        tracing::info!(%method, %path, %reason, "Rejected unauthenticated request");
        self.unauthorized()
    }

    pub fn unauthorized(&self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::err(UNAUTHORIZED_MESSAGE)),
        )
            .into_response()
    }
}
