//! # Natural Core
//!
//! The business rules of the Natural events API, as pure functions over
//! in-memory data.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Boundary (natural-api, axum)       │  ← HTTP, JSON, tokens, storage
//! ├─────────────────────────────────────────┤
//! │      Core (this crate)                  │
//! │  - normalize   (derived state)          │  ← free / offline flags
//! │  - validate    (schedule consistency)   │  ← field/code violations
//! │  - authorize   (actor × operation)      │  ← allow / deny
//! └─────────────────────────────────────────┘
//! ```
//!
//! A write passes through [`derived::normalize`], then
//! [`validation::EventValidator`], with [`authorization::AuthorizationGate`]
//! guarding updates and deletes. [`lifecycle::EventLifecycle`] runs that
//! sequence for each transition. Reads only consult the gate, to decide which
//! capabilities to surface.
//!
//! ## Example
//!
//! ```ignore
//! use natural_core::{EventLifecycle, EventError};
//!
//! let lifecycle = EventLifecycle::new();
//! match lifecycle.create(Some(&identity), fields) {
//!     Ok(event) => repository.save(event).await?,
//!     Err(EventError::Validation(violations)) => return bad_request(violations),
//!     Err(EventError::Forbidden) => return forbidden(),
//!     Err(EventError::NotImplemented(_)) => unreachable!(),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorization;
pub mod derived;
pub mod environment;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod paging;
pub mod repository;
pub mod types;
pub mod validation;

pub use authorization::{Access, AuthorizationGate, Capabilities, Operation};
pub use derived::normalize;
pub use error::EventError;
pub use event::{Event, EventFields, EventPatch, EventStatus};
pub use lifecycle::EventLifecycle;
pub use paging::{Page, PageRequest, Sort};
pub use repository::{EventRepository, RepositoryError, UserRepository};
pub use types::{EventId, Identity, Role, User, UserId};
pub use validation::{EventValidator, Violation, Violations};
