//! Persistence capabilities consumed by the boundary layer.
//!
//! The core never performs I/O itself. These traits describe what the
//! boundary needs from storage, keyed by opaque integer ids.
//!
//! # Implementations
//!
//! - `PostgresEventRepository` / `PostgresUserRepository` (in `natural-postgres`)
//! - `InMemoryEventRepository` / `InMemoryUserRepository` (in `natural-testing`)
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! repositories can be shared as `Arc<dyn EventRepository>` in handler state.

use crate::event::Event;
use crate::paging::{Page, PageRequest};
use crate::types::{EventId, User, UserId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by repository methods.
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Errors that can occur during repository operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// An update targeted a row that does not exist.
    #[error("{resource} {id} does not exist")]
    NotFound {
        /// Kind of record
        resource: &'static str,
        /// Id that was not found
        id: i64,
    },

    /// A stored row could not be mapped back to the domain.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Storage for events.
pub trait EventRepository: Send + Sync {
    /// Insert a new event (assigning its id) or overwrite an existing one.
    ///
    /// An event carrying an id is only ever overwritten. If that row is gone,
    /// for instance deleted by a concurrent request, nothing is written.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event has an id with no stored row, `Database` if
    /// the write fails.
    fn save(&self, event: Event) -> RepositoryFuture<'_, Event>;

    /// Load an event by id.
    ///
    /// # Errors
    ///
    /// `Database` if the read fails.
    fn find_by_id(&self, id: EventId) -> RepositoryFuture<'_, Option<Event>>;

    /// Load one page of events.
    ///
    /// # Errors
    ///
    /// `Database` if the read fails.
    fn find_all(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Event>>;

    /// Remove an event. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// `Database` if the write fails.
    fn delete_by_id(&self, id: EventId) -> RepositoryFuture<'_, bool>;
}

/// Storage for user accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a new user (assigning its id) or overwrite an existing one.
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered to another account.
    fn save(&self, user: User) -> RepositoryFuture<'_, User>;

    /// Load a user by id.
    ///
    /// # Errors
    ///
    /// `Database` if the read fails.
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<'_, Option<User>>;

    /// Load a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// `Database` if the read fails.
    fn find_by_email<'a>(&'a self, email: &'a str) -> RepositoryFuture<'a, Option<User>>;
}
