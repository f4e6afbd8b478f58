//! `POST /oauth/token`.

use super::error::AuthError;
use super::service::AuthService;
use super::tokens::TokenGrant;
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
};
use natural_web::CorrelationId;
use serde::Deserialize;

/// Form body of a token request.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    /// `password` or `refresh_token`.
    pub grant_type: Option<String>,
    /// Login email, for the password grant.
    pub username: Option<String>,
    /// Password, for the password grant.
    pub password: Option<String>,
    /// Refresh token, for the refresh grant.
    pub refresh_token: Option<String>,
    /// Requested scope. Ignored; every token gets the full scope.
    pub scope: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::InvalidRequest(format!("Missing parameter: {name}")))
}

/// Issue tokens.
///
/// The client authenticates with HTTP Basic; the user with the password
/// grant, or a previous refresh token.
///
/// # Example
///
/// ```bash
/// curl -u myApp:pass http://localhost:8080/oauth/token \
///   -d grant_type=password -d username=user@email.com -d password=user
/// # {"access_token":"…","token_type":"bearer","refresh_token":"…","expires_in":599,"scope":"read write trust"}
/// ```
///
/// # Errors
///
/// - 401 `invalid_client` for missing or wrong client credentials
/// - 400 `invalid_grant` for bad user credentials or an unusable refresh token
/// - 400 `unsupported_grant_type` for any other grant
pub async fn issue_token(
    State(auth): State<AuthService>,
    correlation_id: CorrelationId,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenGrant>, AuthError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    auth.client().verify(authorization)?;

    let grant_type = required(request.grant_type, "grant_type")?;
    tracing::debug!(%correlation_id, grant_type = %grant_type, "Token requested");

    let grant = match grant_type.as_str() {
        "password" => {
            let username = required(request.username, "username")?;
            let password = required(request.password, "password")?;
            auth.password_grant(&username, &password).await?
        }
        "refresh_token" => {
            let refresh_token = required(request.refresh_token, "refresh_token")?;
            auth.refresh_grant(&refresh_token).await?
        }
        other => return Err(AuthError::UnsupportedGrantType(other.to_string())),
    };

    Ok(Json(grant))
}
