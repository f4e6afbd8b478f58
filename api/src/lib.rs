//! # Natural Events API
//!
//! A hypermedia REST API for managing events (sessions with an enrollment
//! window, pricing and an enrollment limit).
//!
//! ## Features
//!
//! - **HAL resources**: every response links to what the caller may do next
//! - **OAuth2 password grant**: `POST /oauth/token` issues bearer tokens
//! - **Owner-or-admin writes**: only an event's manager or an admin may change it
//! - **Pluggable storage**: `PostgreSQL` when `DATABASE_URL` is set, in-memory otherwise
//!
//! ## Architecture
//!
//! ```text
//! HTTP → CurrentUser → handler → EventLifecycle (natural-core) → EventRepository
//!                                   authorize → normalize → validate
//! ```
//!
//! The lifecycle never performs I/O. Handlers load the stored event, ask the
//! lifecycle for the next state, persist it, and wrap it in links.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod index;
pub mod server;

pub use bootstrap::{Repositories, build_state};
pub use config::Config;
pub use server::{AppState, build_router};
