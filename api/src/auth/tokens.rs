//! In-memory OAuth2 token store.
//!
//! Access and refresh tokens are opaque random UUIDs mapped to the identity
//! they were issued for:
//!
//! - **Expiry**: checked against the injected [`Clock`] on every lookup
//! - **Rotation**: a refresh token is single-use; redeeming it revokes the
//!   access token issued with it
//! - **Volatility**: tokens do not survive a restart

use chrono::{DateTime, Duration, Utc};
use natural_core::Identity;
use natural_core::environment::Clock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Scope granted to every token.
pub const SCOPE: &str = "read write trust";

/// Longest lifetime accepted for either token kind (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs.min(MAX_TTL_SECS)).unwrap_or_default())
}

/// Token endpoint success body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenGrant {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: &'static str,
    /// Single-use token for obtaining a new pair.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Granted scope.
    pub scope: &'static str,
}

#[derive(Debug)]
struct AccessEntry {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct RefreshEntry {
    identity: Identity,
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tokens {
    access: HashMap<String, AccessEntry>,
    refresh: HashMap<String, RefreshEntry>,
}

/// Issues and resolves bearer tokens.
#[derive(Clone)]
pub struct TokenStore {
    clock: Arc<dyn Clock>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    tokens: Arc<RwLock<Tokens>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            clock,
            access_ttl_secs: access_ttl_secs.min(MAX_TTL_SECS),
            refresh_ttl_secs: refresh_ttl_secs.min(MAX_TTL_SECS),
            tokens: Arc::new(RwLock::new(Tokens::default())),
        }
    }

    /// Issue a fresh access/refresh pair for `identity`.
    pub async fn issue(&self, identity: Identity) -> TokenGrant {
        let now = self.clock.now();
        let access_token = Uuid::new_v4().to_string();
        let refresh_token = Uuid::new_v4().to_string();

        let mut tokens = self.tokens.write().await;
        tokens.access.insert(
            access_token.clone(),
            AccessEntry {
                identity: identity.clone(),
                expires_at: now + ttl(self.access_ttl_secs),
            },
        );
        tokens.refresh.insert(
            refresh_token.clone(),
            RefreshEntry {
                identity,
                access_token: access_token.clone(),
                expires_at: now + ttl(self.refresh_ttl_secs),
            },
        );

        TokenGrant {
            access_token,
            token_type: "bearer",
            refresh_token,
            expires_in: self.access_ttl_secs,
            scope: SCOPE,
        }
    }

    /// The identity behind a live access token.
    pub async fn resolve(&self, access_token: &str) -> Option<Identity> {
        let now = self.clock.now();
        {
            let tokens = self.tokens.read().await;
            match tokens.access.get(access_token) {
                Some(entry) if entry.expires_at > now => return Some(entry.identity.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.tokens.write().await.access.remove(access_token);
        None
    }

    /// Redeem a refresh token, revoking it and its access token.
    ///
    /// Returns the identity it was issued for, or `None` if the token is
    /// unknown, already used or expired.
    pub async fn redeem(&self, refresh_token: &str) -> Option<Identity> {
        let now = self.clock.now();
        let mut tokens = self.tokens.write().await;
        let entry = tokens.refresh.remove(refresh_token)?;
        tokens.access.remove(&entry.access_token);
        (entry.expires_at > now).then_some(entry.identity)
    }

    /// Drop every expired token. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.access.len() + tokens.refresh.len();
        tokens.access.retain(|_, entry| entry.expires_at > now);
        tokens.refresh.retain(|_, entry| entry.expires_at > now);
        before - tokens.access.len() - tokens.refresh.len()
    }
}
