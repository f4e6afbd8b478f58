//! Event endpoints.
//!
//! - `GET    /api/events`              - List events (anonymous allowed)
//! - `GET    /api/events/:id`          - Get one event (anonymous allowed)
//! - `POST   /api/events`              - Create an event (requires auth)
//! - `PUT    /api/events/:id`          - Replace an event (owner or admin)
//! - `PATCH  /api/events/:id`          - Partially update an event (owner or admin)
//! - `DELETE /api/events/:id`          - Delete an event (owner or admin)
//! - `POST   /api/events/:id/publish`  - Publish an event (not implemented)
//!
//! Every write resolves the stored event first, so a missing id is a 404
//! regardless of who asks. Refusals map to 401 for anonymous callers and
//! 403 for authenticated ones.

use super::payload::{EventPatchPayload, EventPayload};
use super::resource::{self, EventResource};
use crate::auth::CurrentUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use natural_core::paging::DEFAULT_PAGE_SIZE;
use natural_core::{Event, EventError, EventId, Identity, PageRequest, Sort};
use natural_web::{AppError, CorrelationId, PagedModel};
use serde::Deserialize;
use serde::de::DeserializeOwned;

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Page number (0-indexed)
    #[serde(default)]
    pub page: usize,
    /// Page size (default: 20, max: 100)
    pub size: Option<usize>,
    /// `property[,asc|desc]`
    pub sort: Option<String>,
}

impl ListEventsQuery {
    fn into_request(self) -> Result<PageRequest, AppError> {
        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<Sort>)
            .transpose()
            .map_err(|e| AppError::bad_request(e.to_string()))?
            .unwrap_or_default();
        let request = PageRequest::new(self.page, self.size.unwrap_or(DEFAULT_PAGE_SIZE), sort);
        if !request.is_addressable() {
            return Err(AppError::bad_request(format!(
                "Page {} is out of range",
                request.page
            )));
        }
        Ok(request)
    }
}

// ============================================================================
// Helpers
// ============================================================================

const AUTHENTICATION_REQUIRED: &str = "Full authentication is required to access this resource";

fn body<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn event_id(path: Result<Path<i64>, PathRejection>) -> Result<EventId, AppError> {
    path.map(|Path(id)| EventId::new(id))
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn authenticated(actor: Option<Identity>) -> Result<Identity, AppError> {
    actor.ok_or_else(|| AppError::unauthorized(AUTHENTICATION_REQUIRED))
}

/// Map a refused transition onto an HTTP error.
fn refused(error: EventError, actor: Option<&Identity>) -> AppError {
    match error {
        EventError::Validation(violations) => AppError::invalid("Invalid event", violations),
        EventError::Forbidden if actor.is_none() => AppError::unauthorized(AUTHENTICATION_REQUIRED),
        EventError::Forbidden => AppError::forbidden("You may not modify this event"),
        EventError::NotImplemented(operation) => AppError::not_implemented(operation),
    }
}

async fn find(state: &AppState, id: EventId) -> Result<Event, AppError> {
    state
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))
}

/// Resolve the event and check that `actor` may change it, in that order.
async fn managed(
    state: &AppState,
    id: EventId,
    actor: Option<Identity>,
) -> Result<(Event, Identity), AppError> {
    let current = find(state, id).await?;
    let actor = authenticated(actor)?;
    if !state.lifecycle.gate().can_manage(Some(&actor), &current) {
        return Err(refused(EventError::Forbidden, Some(&actor)));
    }
    Ok((current, actor))
}

// ============================================================================
// Handlers
// ============================================================================

/// List events, one page at a time.
///
/// # Example
///
/// ```bash
/// curl 'http://localhost:8080/api/events?page=1&size=10&sort=name,desc'
/// ```
///
/// # Errors
///
/// 400 for an unparseable query string or sort expression.
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<PagedModel<EventResource>>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let request = query.into_request()?;

    let page = state.events.find_all(request).await?;
    let can_create = state.lifecycle.capabilities(actor.as_ref(), None).can_create;

    Ok(Json(resource::page(&state.links, page, &request, can_create)))
}

/// Get a single event.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events/1
/// ```
///
/// # Errors
///
/// 404 if the event does not exist.
pub async fn get_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<EventResource>, AppError> {
    let event = find(&state, event_id(path)?).await?;
    let capabilities = state.lifecycle.capabilities(actor.as_ref(), Some(&event));
    Ok(Json(resource::read(&state.links, event, capabilities)))
}

/// Create a new event managed by the caller.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events \
///   -H "Authorization: Bearer $TOKEN" \
///   -H "Content-Type: application/json" \
///   -d '{"name":"Spring","beginEnrollmentDateTime":"2018-10-19T08:00:00",...}'
/// ```
///
/// # Errors
///
/// - 401 for anonymous callers
/// - 400 with field violations for an invalid payload
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    correlation_id: CorrelationId,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let actor = authenticated(actor)?;
    let fields = body(payload)?
        .bind()
        .map_err(|violations| AppError::invalid("Invalid event", violations))?;

    let event = state
        .lifecycle
        .create(Some(&actor), fields)
        .map_err(|e| refused(e, Some(&actor)))?;
    let event = state.events.save(event).await?;

    tracing::info!(
        %correlation_id,
        event_id = ?event.id,
        manager = %actor.id,
        "Event created"
    );
    metrics::counter!("natural.events.written", "operation" => "create").increment(1);

    let resource = resource::created(&state.links, event);
    let location = resource
        .links
        .get("self")
        .map(|link| link.href.clone())
        .unwrap_or_default();

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(resource)).into_response())
}

/// Replace the user-supplied data of an event.
///
/// # Errors
///
/// - 404 if the event does not exist
/// - 401 for anonymous callers, 403 for callers who neither own the event nor are admins
/// - 400 with field violations for an invalid payload or schedule
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    correlation_id: CorrelationId,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Json<EventResource>, AppError> {
    let (current, actor) = managed(&state, event_id(path)?, actor).await?;
    let fields = body(payload)?
        .bind()
        .map_err(|violations| AppError::invalid("Invalid event", violations))?;

    let event = state
        .lifecycle
        .update(Some(&actor), &current, fields)
        .map_err(|e| refused(e, Some(&actor)))?;
    let event = state.events.save(event).await?;

    tracing::info!(%correlation_id, event_id = ?event.id, actor = %actor.id, "Event updated");
    metrics::counter!("natural.events.written", "operation" => "update").increment(1);

    Ok(Json(resource::updated(&state.links, event)))
}

/// Merge a partial update into an event.
///
/// # Example
///
/// ```bash
/// curl -X PATCH http://localhost:8080/api/events/1 \
///   -H "Authorization: Bearer $TOKEN" \
///   -H "Content-Type: application/json" \
///   -d '{"location":null,"maxPrice":0}'
/// ```
///
/// # Errors
///
/// Same as [`update_event`].
pub async fn patch_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    correlation_id: CorrelationId,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EventPatchPayload>, JsonRejection>,
) -> Result<Json<EventResource>, AppError> {
    let (current, actor) = managed(&state, event_id(path)?, actor).await?;
    let patch = body(payload)?
        .bind()
        .map_err(|violations| AppError::invalid("Invalid event", violations))?;

    let event = state
        .lifecycle
        .patch(Some(&actor), &current, patch)
        .map_err(|e| refused(e, Some(&actor)))?;
    let event = state.events.save(event).await?;

    tracing::info!(%correlation_id, event_id = ?event.id, actor = %actor.id, "Event patched");
    metrics::counter!("natural.events.written", "operation" => "patch").increment(1);

    Ok(Json(resource::updated(&state.links, event)))
}

/// Delete an event. Responds with the removed event.
///
/// # Errors
///
/// - 404 if the event does not exist
/// - 401 for anonymous callers, 403 for callers who neither own the event nor are admins
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    correlation_id: CorrelationId,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<EventResource>, AppError> {
    let id = event_id(path)?;
    let current = find(&state, id).await?;
    state
        .lifecycle
        .delete(actor.as_ref(), &current)
        .map_err(|e| refused(e, actor.as_ref()))?;

    // Lost a race with another delete
    if !state.events.delete_by_id(id).await? {
        return Err(AppError::not_found("Event", id));
    }

    tracing::info!(%correlation_id, event_id = %id, actor = ?actor.map(|a| a.id), "Event deleted");
    metrics::counter!("natural.events.written", "operation" => "delete").increment(1);

    Ok(Json(resource::deleted(&state.links, current)))
}

/// Publish an event.
///
/// # Errors
///
/// - 404 if the event does not exist
/// - 501 otherwise
pub async fn publish_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<EventResource>, AppError> {
    let current = find(&state, event_id(path)?).await?;
    let event = state
        .lifecycle
        .publish(actor.as_ref(), &current)
        .map_err(|e| refused(e, actor.as_ref()))?;
    Ok(Json(resource::updated(&state.links, event)))
}
