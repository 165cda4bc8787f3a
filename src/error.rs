//! Error types for medauth

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ApiResponse;
use crate::auth::{AuthError, AuthenticationEntryPoint, TokenError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Failed to issue token: {0}")]
    TokenIssue(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Config file not found. Run 'medauth init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Auth(e) => e.into_response(),
            Error::Token(_) => AuthenticationEntryPoint.unauthorized(),
            e => {
                tracing::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::err("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
