//! Authentication: password hashing, the OAuth2 token endpoint and actor
//! resolution.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod service;
pub mod tokens;

pub use error::AuthError;
pub use extractors::{BearerToken, CurrentUser};
pub use service::{AuthService, ClientCredentials};
pub use tokens::{TokenGrant, TokenStore};
