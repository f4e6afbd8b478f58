//! Error types for web handlers.
//!
//! Every failure leaves the API as the same JSON body:
//!
//! ```json
//! {
//!   "code": "BAD_REQUEST",
//!   "message": "Invalid event",
//!   "errors": [{ "field": "endEventDateTime", "code": "wrong.datetime" }],
//!   "_links": { "index": { "href": "http://localhost:8080/api/" } }
//! }
//! ```
//!
//! `errors` is only present for validation failures. The index link is
//! rendered relative by [`AppError`] and made absolute by the
//! [`link_error_index`] response mapper, which knows the public base URL.

use crate::hal::{Link, Links};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use natural_core::Violations;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Path of the API index, which every error body links back to.
pub const INDEX_PATH: &str = "/api/";

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Event>, AppError> {
///     let event = repository.find_by_id(id).await?
///         .ok_or_else(|| AppError::not_found("Event", id))?;
///     Ok(Json(event))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Field violations, for validation failures
    errors: Option<Violations>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            errors: None,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 400 Bad Request error listing field violations.
    #[must_use]
    pub fn invalid(message: impl Into<String>, violations: Violations) -> Self {
        let mut error = Self::bad_request(message);
        error.errors = Some(violations);
        error
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 501 Not Implemented error.
    #[must_use]
    pub fn not_implemented(operation: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_IMPLEMENTED,
            format!("{operation} is not implemented"),
            "NOT_IMPLEMENTED".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Field violations, if this is a validation failure.
    #[must_use]
    pub const fn violations(&self) -> Option<&Violations> {
        self.errors.as_ref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
    /// Field violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Violations>,
    /// Navigation back to the API index.
    #[serde(rename = "_links")]
    links: Links,
}

impl ErrorBody {
    fn with_index(mut self, href: String) -> Self {
        self.links.insert("index", Link::new(href));
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() && self.status != StatusCode::NOT_IMPLEMENTED {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
            errors: self.errors,
            links: Links::new(),
        }
        .with_index(INDEX_PATH.to_string());

        let mut response = (self.status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Response mapper that rewrites the index link of error bodies against
/// `base_url`.
///
/// Install with `axum::middleware::map_response_with_state`.
pub async fn link_error_index(State(base_url): State<Arc<str>>, mut response: Response) -> Response {
    let Some(body) = response.extensions_mut().remove::<ErrorBody>() else {
        return response;
    };
    let status = response.status();
    let body = body.with_index(format!("{}{INDEX_PATH}", base_url.trim_end_matches('/')));

    let mut rebuilt = (status, Json(body)).into_response();
    for (name, value) in response.headers() {
        if name != http::header::CONTENT_LENGTH {
            rebuilt.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rebuilt
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<natural_core::RepositoryError> for AppError {
    fn from(err: natural_core::RepositoryError) -> Self {
        match err {
            natural_core::RepositoryError::Conflict(message) => Self::conflict(message),
            natural_core::RepositoryError::NotFound { resource, id } => Self::not_found(resource, id),
            other => Self::internal("An internal error occurred").with_source(other.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, middleware::map_response_with_state, routing::get};
    use axum_test::TestServer;
    use natural_core::RepositoryError;
    use serde_json::{Value, json};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Event", "123");
        assert_eq!(err.to_string(), "[NOT_FOUND] Event with id 123 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_implemented() {
        let err = AppError::not_implemented("publish");
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.code(), "NOT_IMPLEMENTED");
    }

    #[test]
    fn test_invalid_carries_violations() {
        let mut violations = Violations::new();
        violations.reject("name", "NotEmpty");
        let err = AppError::invalid("Invalid event", violations);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.violations().map(Violations::len), Some(1));
    }

    #[test]
    fn test_repository_conflict_maps_to_409() {
        let err = AppError::from(RepositoryError::Conflict("email taken".to_string()));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = AppError::from(RepositoryError::NotFound { resource: "Event", id: 7 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "[NOT_FOUND] Event with id 7 not found");

        let err = AppError::from(RepositoryError::Database("down".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_body_links_to_absolute_index() {
        async fn failing() -> Result<(), AppError> {
            let mut violations = Violations::new();
            violations.reject("endEventDateTime", "wrong.datetime");
            Err(AppError::invalid("Invalid event", violations))
        }

        let base: Arc<str> = Arc::from("http://example.com/");
        let app = Router::new()
            .route("/fail", get(failing))
            .layer(map_response_with_state(base, link_error_index));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/fail").await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(
            body["errors"],
            json!([{ "field": "endEventDateTime", "code": "wrong.datetime" }])
        );
        assert_eq!(body["_links"]["index"]["href"], "http://example.com/api/");
    }

    #[tokio::test]
    async fn test_body_without_mapper_uses_relative_index() {
        let app = Router::new().route(
            "/missing",
            get(|| async { AppError::not_found("Event", 7) }),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.get("/missing").await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["_links"]["index"]["href"], INDEX_PATH);
        assert!(body.get("errors").is_none());
    }
}
