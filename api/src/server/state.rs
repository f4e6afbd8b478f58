//! Application state for the events HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Event repository (PostgreSQL or in-memory)
//! - Authentication service (users and tokens)
//! - Link builder (absolute HAL links)
//! - Event lifecycle (authorization, derivation, validation)

use crate::auth::AuthService;
use axum::extract::FromRef;
use natural_core::{EventLifecycle, EventRepository};
use natural_web::LinkBuilder;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Event storage
    pub events: Arc<dyn EventRepository>,

    /// Users, passwords and tokens
    pub auth: AuthService,

    /// Builds absolute links from the public base URL
    pub links: LinkBuilder,

    /// Stateless transition rules
    pub lifecycle: EventLifecycle,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(events: Arc<dyn EventRepository>, auth: AuthService, links: LinkBuilder) -> Self {
        Self {
            events,
            auth,
            links,
            lifecycle: EventLifecycle::new(),
        }
    }
}

// Lets `CurrentUser` and the token endpoint pull the auth service out of AppState
impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for LinkBuilder {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.links.clone()
    }
}
