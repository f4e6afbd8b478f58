//! Configuration management for the events API.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `main` calls `dotenvy::dotenv()` first, so a `.env` file works too.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Accounts, OAuth client and token lifetimes
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Public base URL, used to build absolute links
    pub base_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. In-memory repositories are used when absent.
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

/// A bootstrap account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Login email
    pub username: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Default administrator (`ADMIN`, `USER`)
    pub admin: AccountConfig,
    /// Default regular user (`USER`)
    pub user: AccountConfig,
    /// OAuth client id accepted by the token endpoint
    pub client_id: String,
    /// OAuth client secret accepted by the token endpoint
    pub client_secret: String,
    /// Access token lifetime in seconds (default: 10 minutes)
    pub access_token_ttl: u64,
    /// Refresh token lifetime in seconds (default: 1 hour)
    pub refresh_token_ttl: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parsed_or("PORT", 8080),
                base_url: var_or("BASE_URL", "http://localhost:8080"),
                log_level: var_or("RUST_LOG", "info"),
                shutdown_timeout: parsed_or("SHUTDOWN_TIMEOUT", 30),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
                connect_timeout: parsed_or("DATABASE_CONNECT_TIMEOUT", 30),
            },
            security: SecurityConfig {
                admin: AccountConfig {
                    username: var_or("APP_ADMIN_USERNAME", "admin@email.com"),
                    password: var_or("APP_ADMIN_PASSWORD", "admin"),
                },
                user: AccountConfig {
                    username: var_or("APP_USER_USERNAME", "user@email.com"),
                    password: var_or("APP_USER_PASSWORD", "user"),
                },
                client_id: var_or("APP_CLIENT_ID", "myApp"),
                client_secret: var_or("APP_CLIENT_SECRET", "pass"),
                access_token_ttl: parsed_or("APP_ACCESS_TOKEN_TTL", 600),
                refresh_token_ttl: parsed_or("APP_REFRESH_TOKEN_TTL", 3600),
            },
        }
    }

    /// Socket address to bind, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    /// Tracing filter built from `log_level`, falling back to `info` when
    /// the directive does not parse.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Shutdown grace period.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl DatabaseConfig {
    /// Pool acquire timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    /// Defaults only, ignoring the environment. Used by tests.
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
                log_level: "info".to_string(),
                shutdown_timeout: 30,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connect_timeout: 30,
            },
            security: SecurityConfig {
                admin: AccountConfig {
                    username: "admin@email.com".to_string(),
                    password: "admin".to_string(),
                },
                user: AccountConfig {
                    username: "user@email.com".to_string(),
                    password: "user".to_string(),
                },
                client_id: "myApp".to_string(),
                client_secret: "pass".to_string(),
                access_token_ttl: 600,
                refresh_token_ttl: 3600,
            },
        }
    }
}
