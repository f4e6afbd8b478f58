//! Account and token operations behind the token endpoint.

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::tokens::{TokenGrant, TokenStore};
use base64::Engine;
use natural_core::{Identity, Role, User, UserRepository};
use std::sync::Arc;

/// OAuth client credentials accepted by the token endpoint.
#[derive(Clone)]
pub struct ClientCredentials {
    id: String,
    secret: String,
}

impl ClientCredentials {
    /// Creates the accepted credential pair.
    #[must_use]
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// Check an `Authorization: Basic ...` header value.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidClient`] when the header is missing, malformed or
    /// carries other credentials.
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let encoded = authorization
            .and_then(|value| value.strip_prefix("Basic "))
            .ok_or(AuthError::InvalidClient)?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidClient)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidClient)?;
        let (id, secret) = decoded.split_once(':').ok_or(AuthError::InvalidClient)?;

        // Compare both halves so timing does not reveal which one mismatched
        let id_matches = constant_time_eq::constant_time_eq(id.as_bytes(), self.id.as_bytes());
        let secret_matches =
            constant_time_eq::constant_time_eq(secret.as_bytes(), self.secret.as_bytes());

        if id_matches && secret_matches {
            Ok(())
        } else {
            Err(AuthError::InvalidClient)
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Users, passwords and tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenStore,
    client: ClientCredentials,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenStore, client: ClientCredentials) -> Self {
        Self {
            users,
            tokens,
            client,
        }
    }

    /// Accepted client credentials.
    #[must_use]
    pub const fn client(&self) -> &ClientCredentials {
        &self.client
    }

    /// The token store.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Store a new account with a hashed password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Repository`] with `Conflict` if the email is taken
    /// - [`AuthError::Hashing`] if hashing fails
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<User, AuthError> {
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(AuthError::Hashing)?;

        let user = self.users.save(User::new(email, hash, roles)).await?;
        tracing::info!(user_id = ?user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Register an account unless its email is already taken.
    ///
    /// Returns the stored account and whether it was created now.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub async fn ensure_user(
        &self,
        email: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<(User, bool), AuthError> {
        if let Some(existing) = self.users.find_by_email(email).await? {
            return Ok((existing, false));
        }
        Ok((self.register(email, password, roles).await?, true))
    }

    /// Resource-owner password grant.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidGrant`] for an unknown email or a wrong password.
    pub async fn password_grant(&self, username: &str, password: &str) -> Result<TokenGrant, AuthError> {
        let identity = self.authenticate(username, password).await?;
        tracing::info!(user_id = %identity.id, "Password grant issued");
        metrics::counter!("natural.auth.tokens.issued", "grant_type" => "password").increment(1);
        Ok(self.tokens.issue(identity).await)
    }

    /// Refresh-token grant. Reloads the account so role changes take effect.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidGrant`] for an unknown, used or expired token, or
    /// when the account no longer exists.
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let previous = self
            .tokens
            .redeem(refresh_token)
            .await
            .ok_or_else(|| AuthError::InvalidGrant("Invalid refresh token".to_string()))?;

        let identity = self
            .users
            .find_by_id(previous.id)
            .await?
            .and_then(|user| user.identity())
            .ok_or_else(|| AuthError::InvalidGrant("Account no longer exists".to_string()))?;

        tracing::info!(user_id = %identity.id, "Refresh grant issued");
        metrics::counter!("natural.auth.tokens.issued", "grant_type" => "refresh_token")
            .increment(1);
        Ok(self.tokens.issue(identity).await)
    }

    /// The identity behind a live access token.
    pub async fn resolve(&self, access_token: &str) -> Option<Identity> {
        self.tokens.resolve(access_token).await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let bad_credentials = || AuthError::InvalidGrant("Bad credentials".to_string());

        let user = self
            .users
            .find_by_email(username)
            .await?
            .ok_or_else(bad_credentials)?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !verified {
            tracing::warn!(email = %user.email, "Password verification failed");
            return Err(bad_credentials());
        }
        user.identity().ok_or_else(bad_credentials)
    }
}
