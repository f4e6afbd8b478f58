//! Identifiers and actor types.
//!
//! Events and users are keyed by opaque integer ids assigned by the
//! persistence layer. Ownership is always decided by comparing [`UserId`]s,
//! never by email or by structural equality of whole user records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Roles and identities
// ============================================================================

/// Role granted to a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular authenticated user.
    User,
    /// Administrator; owner-equivalent rights on every event.
    Admin,
}

impl Role {
    /// Stable string form, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated actor.
///
/// Anonymous requests carry no `Identity` at all; every authorization call
/// takes an `Option<&Identity>` explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account identifier.
    pub id: UserId,
    /// Login email (informational only, never used for ownership).
    pub email: String,
    /// Granted roles.
    pub roles: BTreeSet<Role>,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            email: email.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether this identity holds the `ADMIN` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Identity comparison by id.
    #[must_use]
    pub fn is(&self, user_id: UserId) -> bool {
        self.id == user_id
    }
}

/// A stored user account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Assigned by the repository on first save.
    pub id: Option<UserId>,
    /// Unique (case-insensitive) login email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Granted roles.
    pub roles: BTreeSet<Role>,
}

impl User {
    /// Creates an unsaved user.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            password_hash: password_hash.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// The identity of a persisted user, or `None` before the first save.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.id.map(|id| Identity {
            id,
            email: self.email.clone(),
            roles: self.roles.clone(),
        })
    }
}
