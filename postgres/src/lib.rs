//! `PostgreSQL` repositories for the Natural events API.
//!
//! Implements the `EventRepository` and `UserRepository` traits from
//! `natural-core` on top of a sqlx connection pool:
//!
//! - Events with paging and whitelisted sort columns
//! - Users with roles in a side table and case-insensitive email lookup
//! - Embedded migrations
//!
//! # Example
//!
//! ```ignore
//! use natural_postgres::{PostgresEventRepository, connect, migrate};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = connect("postgres://localhost/natural", 5, Duration::from_secs(5)).await?;
//!     migrate(&pool).await?;
//!     let events = PostgresEventRepository::new(pool);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod users;

pub use events::PostgresEventRepository;
pub use users::PostgresUserRepository;

use natural_core::RepositoryError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`RepositoryError::Database`] if the database cannot be reached.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, RepositoryError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to connect: {e}")))
}

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns [`RepositoryError::Database`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations complete");
    Ok(())
}

fn database_error(context: &str, error: &sqlx::Error) -> RepositoryError {
    RepositoryError::Database(format!("{context}: {error}"))
}
