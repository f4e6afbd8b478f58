//! Actor resolution for API handlers.
//!
//! ```rust,ignore
//! async fn create_event(CurrentUser(actor): CurrentUser, ...) -> Result<Response, AppError> {
//!     // actor: Option<Identity>, None for anonymous requests
//! }
//! ```

use super::service::AuthService;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use natural_core::Identity;
use natural_web::AppError;

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Parse the `Authorization` header.
    ///
    /// `Ok(None)` when the header is absent.
    ///
    /// # Errors
    ///
    /// 401 when the header is present but not a non-empty bearer token.
    pub fn from_parts(parts: &Parts) -> Result<Option<Self>, AppError> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .trim();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }
        Ok(Some(Self(token.to_string())))
    }
}

/// The acting user, if any.
///
/// No `Authorization` header means anonymous (`None`). A header carrying
/// anything other than a live bearer token is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    /// The identity, when authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(BearerToken(token)) = BearerToken::from_parts(parts)? else {
            return Ok(Self(None));
        };

        let auth = AuthService::from_ref(state);
        let identity = auth
            .resolve(&token)
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid or expired access token"))?;

        Ok(Self(Some(identity)))
    }
}
