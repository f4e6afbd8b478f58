//! Custom Axum extractors.

use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::fmt;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Set by [`correlation_id_layer`](crate::correlation_id_layer); when the
/// layer is not installed it is read from the `X-Correlation-ID` header, or
/// generated.
///
/// # Example
///
/// ```ignore
/// async fn create_event(correlation_id: CorrelationId, ...) -> Result<Response, AppError> {
///     tracing::info!(%correlation_id, "Creating event");
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Parse the header value, if it is a UUID.
    #[must_use]
    pub fn from_header(value: Option<&http::HeaderValue>) -> Option<Self> {
        value
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
    }

    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Self>()
            .copied()
            .or_else(|| Self::from_header(parts.headers.get(CORRELATION_ID_HEADER)))
            .unwrap_or_else(Self::generate);

        Ok(correlation_id)
    }
}
