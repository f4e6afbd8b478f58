//! Token endpoint errors.
//!
//! The token endpoint answers in the OAuth2 error format
//! (`{"error": "...", "error_description": "..."}`) rather than the API's
//! HAL error body, so it has its own error type.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use natural_core::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// Authentication failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client credentials missing or wrong.
    #[error("Client authentication failed")]
    InvalidClient,

    /// Bad user credentials, or an unknown/expired refresh token.
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// `grant_type` other than `password` or `refresh_token`.
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// A required parameter is missing.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// OAuth2 error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Hashing(_) | Self::Repository(_) => "server_error",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidClient => StatusCode::UNAUTHORIZED,
            Self::InvalidGrant(_) | Self::UnsupportedGrantType(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Hashing(_) | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct OAuthErrorBody {
    error: &'static str,
    error_description: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Token endpoint failure");
        } else {
            tracing::debug!(error = %self, "Token request rejected");
        }

        let description = if status.is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };
        let body = Json(OAuthErrorBody {
            error: self.code(),
            error_description: description,
        });

        if matches!(self, Self::InvalidClient) {
            (status, [(header::WWW_AUTHENTICATE, "Basic realm=\"oauth2/client\"")], body)
                .into_response()
        } else {
            (status, body).into_response()
        }
    }
}
