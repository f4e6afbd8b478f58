//! Startup wiring: storage selection, default accounts and handler state.

use crate::auth::{AuthService, ClientCredentials, TokenStore};
use crate::config::{Config, DatabaseConfig, SecurityConfig};
use crate::server::AppState;
use anyhow::Context;
use natural_core::environment::Clock;
use natural_core::{EventRepository, Role, UserRepository};
use natural_postgres::{PostgresEventRepository, PostgresUserRepository};
use natural_testing::{InMemoryEventRepository, InMemoryUserRepository};
use natural_web::LinkBuilder;
use std::sync::Arc;

/// The storage backends handlers run against.
#[derive(Clone)]
pub struct Repositories {
    /// Event storage
    pub events: Arc<dyn EventRepository>,
    /// Account storage
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Process-local storage, lost on restart.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// `PostgreSQL` storage at `url`, migrated to the latest schema.
    ///
    /// # Errors
    ///
    /// Fails if the database is unreachable or a migration fails.
    pub async fn postgres(url: &str, config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = natural_postgres::connect(url, config.max_connections, config.connect_timeout())
            .await
            .context("Failed to connect to PostgreSQL")?;
        natural_postgres::migrate(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        })
    }

    /// `PostgreSQL` when a database URL is configured, in-memory otherwise.
    ///
    /// # Errors
    ///
    /// See [`postgres`](Self::postgres).
    pub async fn from_config(config: &DatabaseConfig) -> anyhow::Result<Self> {
        if let Some(url) = &config.url {
            tracing::info!(max_connections = config.max_connections, "Using PostgreSQL storage");
            Self::postgres(url, config).await
        } else {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Ok(Self::in_memory())
        }
    }
}

/// Create the configured admin and regular user if their emails are free.
///
/// # Errors
///
/// Fails if an account cannot be hashed or stored.
pub async fn seed_default_users(auth: &AuthService, security: &SecurityConfig) -> anyhow::Result<()> {
    let accounts = [
        (&security.admin, vec![Role::Admin, Role::User]),
        (&security.user, vec![Role::User]),
    ];

    for (account, roles) in accounts {
        let (user, created) = auth
            .ensure_user(&account.username, &account.password, roles)
            .await
            .with_context(|| format!("Failed to create default account {}", account.username))?;
        if created {
            tracing::info!(email = %user.email, roles = ?user.roles, "Default account created");
        } else {
            tracing::debug!(email = %user.email, "Default account already exists");
        }
    }
    Ok(())
}

/// Build handler state from configuration and seed the default accounts.
///
/// # Errors
///
/// Fails if the default accounts cannot be created.
pub async fn build_state(
    config: &Config,
    repositories: Repositories,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<AppState> {
    let security = &config.security;
    let tokens = TokenStore::new(clock, security.access_token_ttl, security.refresh_token_ttl);
    let client = ClientCredentials::new(&security.client_id, &security.client_secret);
    let auth = AuthService::new(repositories.users, tokens, client);

    seed_default_users(&auth, security).await?;

    Ok(AppState::new(
        repositories.events,
        auth,
        LinkBuilder::new(&config.server.base_url),
    ))
}
